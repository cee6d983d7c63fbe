use reading_ruler::geometry::Rectangle;
use reading_ruler::page::Page;
use reading_ruler::preferences::PreferenceSnapshot;
use reading_ruler::ruler::Ruler;
use reading_ruler::surface::OverlaySurface;
use reading_ruler::visualizer::{Appearance, Visualizer};

const TEXT: &str = "# Title\n\nThe quick brown fox jumps over the lazy dog again and again.\n";

fn ruler_for(page: &Page, appearance: &str) -> Ruler<OverlaySurface> {
    let (width, height) = page.viewport_px();
    let mut ruler = Ruler::new(OverlaySurface::new(width, height));
    ruler.apply_preferences(&PreferenceSnapshot {
        enabled: true,
        appearance: appearance.to_string(),
        ..PreferenceSnapshot::default()
    });
    ruler
}

#[test]
fn tracks_wrapped_lines_of_a_markdown_page() {
    // 22 body columns: the paragraph wraps onto rows 2..=4.
    let page = Page::from_markdown(TEXT, 24, 10);
    let mut ruler = ruler_for(&page, "ruler");

    ruler.position_around(&page, 12.0, 3.0 * 16.0 + 8.0);
    assert_eq!(
        ruler.state().latest_rendered,
        Some(Rectangle::new(4.0, 46.0, 184.0, 20.0))
    );
    let writes = ruler.surface().rect_writes();

    // Sliding along the same line is free.
    for x in [20.0, 60.0, 150.0] {
        ruler.position_around_if_exited(&page, x, 56.0);
    }
    assert_eq!(ruler.surface().rect_writes(), writes);

    ruler.position_around_if_exited(&page, 12.0, 4.0 * 16.0 + 8.0);
    assert_eq!(
        ruler.state().latest_rendered,
        Some(Rectangle::new(4.0, 62.0, 184.0, 20.0))
    );
    assert!(ruler.surface().rect_writes() > writes);
}

#[test]
fn headings_and_blank_rows() {
    let page = Page::from_markdown(TEXT, 24, 10);
    let mut ruler = ruler_for(&page, "ruler");

    ruler.position_around(&page, 12.0, 8.0);
    assert_eq!(
        ruler.state().latest_rendered,
        Some(Rectangle::new(4.0, -2.0, 184.0, 20.0))
    );

    // The blank row between heading and paragraph has no text nearby.
    ruler.position_around(&page, 100.0, 16.0 + 8.0);
    assert_eq!(ruler.state().latest_rendered, None);
    assert_eq!(ruler.state().latest_row_bounds, None);
}

#[test]
fn scrolling_moves_rows_under_a_still_pointer() {
    let mut page = Page::from_markdown(TEXT, 24, 3);
    let mut ruler = ruler_for(&page, "ruler");
    ruler.position_around(&page, 12.0, 2.0 * 16.0 + 8.0);
    let before = ruler.state().latest_rendered;

    assert!(page.scroll_by(1));
    ruler.position_around(&page, 12.0, 2.0 * 16.0 + 8.0);
    let after = ruler.state().latest_rendered;
    assert_eq!(before, Some(Rectangle::new(4.0, 30.0, 184.0, 20.0)));
    assert_eq!(after, before);
    assert_eq!(
        ruler.state().latest_row_bounds,
        Some(Rectangle::new(4.0, 30.0, 184.0, 20.0))
    );
}

#[test]
fn appearance_switch_replaces_elements_and_keeps_the_row() {
    let page = Page::from_markdown(TEXT, 24, 10);
    let mut ruler = ruler_for(&page, "ruler");
    ruler.position_around(&page, 12.0, 3.0 * 16.0 + 8.0);
    assert_eq!(ruler.surface().len(), 1);

    ruler.apply_preferences(&PreferenceSnapshot {
        enabled: true,
        appearance: "negative".into(),
        ..PreferenceSnapshot::default()
    });
    assert!(matches!(ruler.visualizer(), Visualizer::Negative(_)));
    assert_eq!(ruler.surface().len(), 3);
    let mask = ruler.surface().element("--reading-ruler-mask").cloned();
    assert_eq!(mask.map(|m| m.rect), Some(Rectangle::new(0.0, 46.0, 192.0, 20.0)));

    ruler.apply_preferences(&PreferenceSnapshot {
        enabled: true,
        appearance: "sparkles".into(),
        ..PreferenceSnapshot::default()
    });
    assert_eq!(ruler.state().appearance, Appearance::Ruler);
    assert_eq!(ruler.surface().len(), 1);
}

#[test]
fn disabled_ruler_ignores_the_pointer() {
    let page = Page::from_markdown(TEXT, 24, 10);
    let mut ruler = ruler_for(&page, "ruler");
    ruler.apply_preferences(&PreferenceSnapshot {
        enabled: false,
        ..PreferenceSnapshot::default()
    });
    ruler.position_around(&page, 12.0, 3.0 * 16.0 + 8.0);
    assert_eq!(ruler.state().latest_rendered, None);

    // Transient activation does not override the persistent flag.
    ruler.activate();
    assert!(!ruler.is_enabled());
}
