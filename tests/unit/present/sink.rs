use super::*;

fn tile(w: u32, h: u32, v: u8) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba([v, v, v, 255]))
}

#[test]
fn in_memory_sink_records_in_order() {
    let mut sink = InMemorySink::new();
    sink.present(SurfaceKind::Main, FrameIndex(0), &tile(4, 2, 1))
        .unwrap();
    sink.present(SurfaceKind::Icon, FrameIndex(0), &tile(2, 2, 9))
        .unwrap();

    let frames = sink.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].surface, SurfaceKind::Main);
    assert_eq!(frames[0].size(), Canvas::new(4, 2));
    assert_eq!(frames[1].surface, SurfaceKind::Icon);
    assert_eq!(frames[1].image.get_pixel(1, 1).0, [9, 9, 9, 255]);
}

#[test]
fn null_sink_counts_through_a_box() {
    let mut sink = Box::new(NullSink::default());
    for i in 0..3 {
        PresentSink::present(&mut sink, SurfaceKind::Main, FrameIndex(i), &tile(1, 1, 0))
            .unwrap();
    }
    assert_eq!(sink.presented, 3);
}

#[test]
fn png_dir_sink_writes_readable_files() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("target/present_unit/png_dir");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngDirSink::create(&dir).unwrap();
    sink.present(SurfaceKind::Main, FrameIndex(7), &tile(5, 3, 40))
        .unwrap();
    sink.present(SurfaceKind::Icon, FrameIndex(0), &tile(2, 2, 80))
        .unwrap();
    assert_eq!(sink.written(), 2);

    let first = dir.join("000000_main_00007.png");
    let second = dir.join("000001_icon_00000.png");
    let img = image::open(&first).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(4, 2).0, [40, 40, 40, 255]);
    assert!(second.is_file());
}
