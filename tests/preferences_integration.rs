use std::fs;

use reading_ruler::preferences::{PagePreferences, PreferenceStore, site_key};

#[test]
fn page_preferences_survive_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.json");

    let mut store = PreferenceStore::load(&path);
    let mut prefs = PagePreferences::read(&store, "https://example.com/article").unwrap();
    prefs.page_enabled = false;
    prefs.appearance = "negative".into();
    prefs.color_name = "blue".into();
    prefs.opacity = 0.5;
    prefs.write(&mut store).unwrap();
    assert!(path.exists());

    let reloaded = PreferenceStore::load(&path);
    let again = PagePreferences::read(&reloaded, "https://example.com/article").unwrap();
    assert_eq!(again, prefs);
    let snapshot = again.snapshot();
    assert!(!snapshot.enabled);
    assert_eq!(snapshot.color, "#90caf9");

    // The page flag is per URL; the rest is shared.
    let other = PagePreferences::read(&reloaded, "https://example.com/other").unwrap();
    assert!(other.enabled());
    assert_eq!(other.appearance, "negative");
}

#[test]
fn site_flag_covers_every_page_on_the_host() {
    let mut store = PreferenceStore::in_memory();
    let mut prefs = PagePreferences::read(&store, "https://news.example.org:8443/a").unwrap();
    assert_eq!(prefs.host(), "news.example.org:8443");
    prefs.site_enabled = false;
    prefs.write(&mut store).unwrap();

    let sibling = PagePreferences::read(&store, "https://news.example.org:8443/b").unwrap();
    assert!(!sibling.enabled());
    let elsewhere = PagePreferences::read(&store, "https://example.org/").unwrap();
    assert!(elsewhere.enabled());
}

#[test]
fn malformed_file_yields_defaults_and_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    fs::write(&path, "{ not json").unwrap();

    let store = PreferenceStore::load(&path);
    let prefs = PagePreferences::read(&store, "file:///tmp/notes.md").unwrap();
    assert!(prefs.enabled());
    assert_eq!(prefs.appearance, "ruler");
    assert_eq!(prefs.color_name, "yellow");
    assert_eq!(prefs.opacity, 0.2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn host_less_urls_key_by_scheme() {
    assert_eq!(site_key("file:///home/me/notes.md").unwrap(), "file");
    assert_eq!(site_key("https://example.com/x").unwrap(), "example.com");
    assert!(site_key("no scheme here").is_err());
}
