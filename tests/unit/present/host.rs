use super::*;

#[test]
fn fixed_display_repeats_itself() {
    let mut d = FixedDisplay::visible(Canvas::new(64, 48));
    assert_eq!(d.sample(), d.sample());
    assert_eq!(d.sample().canvas, Canvas::new(64, 48));
    assert!(!d.sample().iconified);
}

#[test]
fn scripted_display_applies_changes_at_their_sample() {
    let mut d = ScriptedDisplay::new(DisplayState::visible(Canvas::new(10, 10)))
        .at(3, DisplayChange::Restore)
        .at(1, DisplayChange::Resize(Canvas::new(20, 15)))
        .at(2, DisplayChange::Iconify);

    let seen: Vec<DisplayState> = (0..5).map(|_| d.sample()).collect();
    assert_eq!(seen[0], DisplayState::visible(Canvas::new(10, 10)));
    assert_eq!(seen[1], DisplayState::visible(Canvas::new(20, 15)));
    assert!(seen[2].iconified);
    assert_eq!(seen[2].canvas, Canvas::new(20, 15));
    assert_eq!(seen[3], DisplayState::visible(Canvas::new(20, 15)));
    assert_eq!(seen[4], seen[3]);
    assert_eq!(d.samples(), 5);
}

#[test]
fn same_sample_changes_apply_in_order() {
    let mut d = ScriptedDisplay::new(DisplayState::default())
        .at(0, DisplayChange::Resize(Canvas::new(1, 1)))
        .at(0, DisplayChange::Resize(Canvas::new(2, 2)));
    assert_eq!(d.sample().canvas, Canvas::new(2, 2));
    assert_eq!(d.current().canvas, Canvas::new(2, 2));
}

#[test]
fn boxed_sources_forward() {
    let mut d: Box<dyn DisplaySource> = Box::new(FixedDisplay::visible(Canvas::new(3, 4)));
    assert_eq!(d.sample().canvas, Canvas::new(3, 4));
}
