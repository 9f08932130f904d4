use sitecheck::error::SitemapError;
use sitecheck::sitemap::{Locations, extract_locations, read_locations};
use std::io::Write;

// ===========================================================================================
// extract_locations Tests
// ===========================================================================================

#[test]
fn test_extract_locations_urlset() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
   <url>
      <loc>http://www.example.com/</loc>
      <lastmod>2005-01-01</lastmod>
      <changefreq>monthly</changefreq>
      <priority>0.8</priority>
   </url>
   <url>
      <loc>http://www.example.com/catalog?item=12&amp;desc=vacation_hawaii</loc>
      <changefreq>weekly</changefreq>
   </url>
   <url>
      <loc>http://www.example.com/catalog?item=73&amp;desc=vacation_new_zealand</loc>
      <lastmod>2004-12-23</lastmod>
   </url>
</urlset>"#;
    let urls = extract_locations(xml).expect("valid sitemap");

    assert_eq!(
        urls,
        vec![
            "http://www.example.com/",
            "http://www.example.com/catalog?item=12&desc=vacation_hawaii",
            "http://www.example.com/catalog?item=73&desc=vacation_new_zealand",
        ]
    );
}

#[test]
fn test_extract_locations_from_sitemap_index() {
    // <loc> elements count wherever they appear, not only under <url>.
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
   <sitemap><loc>http://www.example.com/sitemap1.xml</loc></sitemap>
   <sitemap><loc>http://www.example.com/sitemap2.xml</loc></sitemap>
</sitemapindex>"#;
    let urls = extract_locations(xml).unwrap();
    assert_eq!(
        urls,
        vec![
            "http://www.example.com/sitemap1.xml",
            "http://www.example.com/sitemap2.xml"
        ]
    );
}

#[test]
fn test_extract_locations_text_split_by_comment() {
    let xml = "<urlset><url><loc>http://www.example.com/<!-- split -->page</loc></url></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://www.example.com/page"]);
}

#[test]
fn test_extract_locations_cdata_is_concatenated() {
    let xml = "<urlset><loc>http://www.example.com/<![CDATA[a&b]]></loc></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://www.example.com/a&b"]);
}

#[test]
fn test_extract_locations_ignores_nested_element_text() {
    let xml = "<urlset><loc>http://www.example.com/<b>ignored</b>kept</loc></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://www.example.com/kept"]);
}

#[test]
fn test_extract_locations_trims_whitespace() {
    let xml = "<urlset>\n  <url>\n    <loc>\n      http://www.example.com/\n    </loc>\n  </url>\n</urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://www.example.com/"]);
}

#[test]
fn test_extract_locations_namespace_prefix_not_enforced() {
    let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
<sm:url><sm:loc>http://www.example.com/a</sm:loc></sm:url>
<url><loc>http://www.example.com/b</loc></url>
</sm:urlset>"#;
    let urls = extract_locations(xml).unwrap();
    assert_eq!(
        urls,
        vec!["http://www.example.com/a", "http://www.example.com/b"]
    );
}

#[test]
fn test_extract_locations_keeps_duplicates_and_order() {
    let xml = "<urlset><loc>http://b/</loc><loc>http://a/</loc><loc>http://b/</loc></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://b/", "http://a/", "http://b/"]);
}

#[test]
fn test_extract_locations_nested_loc_yields_one_entry_each() {
    let xml = "<urlset><url><loc>http://outer/<loc>http://inner/</loc>tail</loc></url></urlset>";
    let urls = extract_locations(xml).unwrap();
    // Start-tag order, each with its own direct text only.
    assert_eq!(urls, vec!["http://outer/tail", "http://inner/"]);
}

#[test]
fn test_extract_locations_nested_empty_loc_keeps_order() {
    let xml = "<urlset><loc>http://a/<loc/></loc><loc>http://b/</loc></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["http://a/", "", "http://b/"]);
}

#[test]
fn test_extract_locations_empty_loc_yields_empty_entry() {
    let xml = "<urlset><loc/><loc></loc></urlset>";
    let urls = extract_locations(xml).unwrap();
    assert_eq!(urls, vec!["", ""]);
}

#[test]
fn test_extract_locations_no_loc_elements() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
</urlset>"#;
    assert!(extract_locations(xml).unwrap().is_empty());
}

// ===========================================================================================
// Malformed documents
// ===========================================================================================

fn assert_malformed(xml: &str) {
    match extract_locations(xml) {
        Err(SitemapError::Malformed { .. }) => {}
        other => panic!("expected a malformed sitemap error for {xml:?}, got {other:?}"),
    }
}

#[test]
fn test_malformed_not_xml() {
    assert_malformed("This is not XML at all");
}

#[test]
fn test_malformed_empty_string() {
    assert_malformed("");
}

#[test]
fn test_malformed_mismatched_end_tag() {
    assert_malformed("<urlset><url><loc>http://a/</loc></urlset>");
}

#[test]
fn test_malformed_unclosed_element() {
    assert_malformed("<urlset><url><loc>http://a/</loc></url>");
}

#[test]
fn test_malformed_second_root() {
    assert_malformed("<urlset></urlset><urlset></urlset>");
}

#[test]
fn test_malformed_unknown_entity() {
    assert_malformed("<urlset><loc>http://a/?x=&nbsp;</loc></urlset>");
}

#[test]
fn test_locations_is_lazy_and_stops_after_error() {
    let mut locations = Locations::from_xml("<urlset><loc>http://a/</loc><loc>http://b/</loc>");

    assert_eq!(locations.next().unwrap().unwrap(), "http://a/");
    assert_eq!(locations.next().unwrap().unwrap(), "http://b/");
    assert!(matches!(
        locations.next(),
        Some(Err(SitemapError::Malformed { .. }))
    ));
    assert!(locations.next().is_none());
}

// ===========================================================================================
// read_locations Tests
// ===========================================================================================

#[test]
fn test_read_locations_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "<urlset><url><loc>http://ok.example/</loc></url><url><loc>http://404.example/</loc></url></urlset>"
    )
    .unwrap();

    let urls = read_locations(file.path()).unwrap();
    assert_eq!(urls, vec!["http://ok.example/", "http://404.example/"]);
}

#[test]
fn test_read_locations_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.xml");

    match read_locations(&path) {
        Err(SitemapError::Open { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an open error, got {other:?}"),
    }
}
