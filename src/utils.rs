use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to a sitemap argument to name its result file.
pub const RESULT_SUFFIX: &str = "_results.txt";

/// Expands a leading `~` to the user's home directory.
///
/// # Examples
/// ```rust
/// use sitecheck::utils::expand_path;
///
/// assert_eq!(expand_path("/tmp/sitemaps"), std::path::PathBuf::from("/tmp/sitemaps"));
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// The directory containing the running executable, used as the default base directory.
pub fn executable_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("`{}` has no parent directory", exe.display()),
        )
    })
}

/// Name of the result file for a sitemap argument, exactly as given on the command line.
///
/// # Examples
/// ```rust
/// use sitecheck::utils::result_file_name;
///
/// assert_eq!(result_file_name("sitemap.xml"), "sitemap.xml_results.txt");
/// ```
pub fn result_file_name(sitemap: &str) -> String {
    format!("{sitemap}{RESULT_SUFFIX}")
}

/// Path of the result file for a sitemap argument inside `output_dir`.
///
/// An empty `output_dir` keeps the path relative to the working directory.
pub fn result_file_path(output_dir: &Path, sitemap: &str) -> PathBuf {
    output_dir.join(result_file_name(sitemap))
}

/// Resolves a sitemap argument against the base directory. Absolute arguments are kept as is.
pub fn resolve_sitemap_path(base_dir: &Path, sitemap: &str) -> PathBuf {
    base_dir.join(sitemap)
}
