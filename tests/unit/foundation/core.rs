use super::*;

#[test]
fn canvas_parses_w_by_h() {
    let c: Canvas = "640x480".parse().unwrap();
    assert_eq!(c, Canvas::new(640, 480));
    assert_eq!(c.to_string(), "640x480");
    assert_eq!(c.rgba8_len(), 640 * 480 * 4);

    assert!("640".parse::<Canvas>().is_err());
    assert!("ax4".parse::<Canvas>().is_err());
}

#[test]
fn empty_canvas_is_detected() {
    assert!(Canvas::new(0, 10).is_empty());
    assert!(Canvas::new(10, 0).is_empty());
    assert!(!Canvas::new(1, 1).is_empty());
}

#[test]
fn surface_kind_wire_values() {
    assert_eq!(SurfaceKind::Main.to_wire(), 0);
    assert_eq!(SurfaceKind::Icon.to_wire(), 1);
    assert_eq!(SurfaceKind::from_wire(1).unwrap(), SurfaceKind::Icon);
    assert_eq!(SurfaceKind::try_from(0).unwrap(), SurfaceKind::Main);
    assert!(matches!(
        SurfaceKind::from_wire(7),
        Err(PlasmaError::Protocol(_))
    ));
}

#[test]
fn generation_starts_at_one_and_bumps() {
    let g = Generation::default();
    assert_eq!(g, Generation(1));
    assert_eq!(g.bump(), Generation(2));
    assert_eq!(FrameIndex(4).next(), FrameIndex(5));
}
