use sitecheck::utils::{
    expand_path, result_file_name, result_file_path, resolve_sitemap_path,
};
use std::path::{Path, PathBuf};

#[test]
fn test_result_file_name_appends_suffix() {
    assert_eq!(result_file_name("sitemap.xml"), "sitemap.xml_results.txt");
    assert_eq!(result_file_name("maps/a.xml"), "maps/a.xml_results.txt");
}

#[test]
fn test_result_file_path_defaults_to_working_directory() {
    assert_eq!(
        result_file_path(Path::new(""), "sitemap.xml"),
        PathBuf::from("sitemap.xml_results.txt")
    );
    assert_eq!(
        result_file_path(Path::new("/tmp/out"), "sitemap.xml"),
        PathBuf::from("/tmp/out/sitemap.xml_results.txt")
    );
}

#[test]
fn test_resolve_sitemap_path_relative_and_absolute() {
    assert_eq!(
        resolve_sitemap_path(Path::new("/opt/sitecheck"), "sitemap.xml"),
        PathBuf::from("/opt/sitecheck/sitemap.xml")
    );
    assert_eq!(
        resolve_sitemap_path(Path::new("/opt/sitecheck"), "/srv/sitemap.xml"),
        PathBuf::from("/srv/sitemap.xml")
    );
}

#[test]
fn test_expand_path_without_tilde_is_unchanged() {
    assert_eq!(expand_path("relative/dir"), PathBuf::from("relative/dir"));
}

#[test]
fn test_expand_path_expands_home() {
    if std::env::var_os("HOME").is_none() {
        return;
    }
    let expanded = expand_path("~/sitemaps");
    assert!(!expanded.starts_with("~"));
    assert!(expanded.ends_with("sitemaps"));
}
