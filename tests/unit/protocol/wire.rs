use super::*;

fn task(w: u32, h: u32) -> Task {
    Task {
        generation: Generation(3),
        frame_index: FrameIndex(7),
        size: Canvas::new(w, h),
        surface: SurfaceKind::Icon,
    }
}

#[test]
fn task_layout_is_five_le_i32_in_order() {
    let bytes = task(640, 480).encode().unwrap();
    assert_eq!(bytes.len(), 20);
    assert_eq!(&bytes[0..4], &3i32.to_le_bytes());
    assert_eq!(&bytes[4..8], &7i32.to_le_bytes());
    assert_eq!(&bytes[8..12], &640i32.to_le_bytes());
    assert_eq!(&bytes[12..16], &480i32.to_le_bytes());
    assert_eq!(&bytes[16..20], &1i32.to_le_bytes());
    assert_eq!(Task::decode(&bytes).unwrap(), task(640, 480));
}

#[test]
fn task_with_negative_dims_decodes_as_empty() {
    let mut bytes = task(4, 4).encode().unwrap();
    bytes[8..12].copy_from_slice(&(-5i32).to_le_bytes());
    let t = Task::decode(&bytes).unwrap();
    assert!(t.size.is_empty());
}

#[test]
fn task_encode_rejects_values_beyond_i32() {
    let mut t = task(4, 4);
    t.frame_index = FrameIndex(u32::MAX);
    assert!(matches!(t.encode(), Err(PlasmaError::Validation(_))));
}

#[test]
fn result_header_layout_ends_with_payload_size() {
    let t = task(2, 3);
    let h = ResultHeader::for_task(&t, 24).unwrap();
    let bytes = h.encode().unwrap();
    assert_eq!(bytes.len(), RESULT_HEADER_LEN);
    assert_eq!(&bytes[20..24], &24i32.to_le_bytes());

    let back = ResultHeader::decode(&bytes).unwrap();
    assert_eq!(back, h);
    assert_eq!(back.validate().unwrap(), Canvas::new(2, 3));
}

#[test]
fn payload_size_mismatch_is_a_protocol_violation() {
    let mut h = ResultHeader::for_task(&task(2, 3), 24).unwrap();
    h.payload_size = 23;
    assert!(matches!(h.validate(), Err(PlasmaError::Protocol(_))));
    assert_eq!(h.drainable_len(), Some(23));

    h.payload_size = -1;
    assert!(h.validate().is_err());
    assert_eq!(h.drainable_len(), None);
}

#[test]
fn non_positive_dims_have_no_expected_len() {
    let mut h = ResultHeader::for_task(&task(2, 3), 24).unwrap();
    h.width = 0;
    assert_eq!(h.expected_payload_len(), None);
    assert!(matches!(h.validate(), Err(PlasmaError::Protocol(_))));
}

#[test]
fn negative_generation_on_the_wire_is_rejected() {
    let mut bytes = ResultHeader::for_task(&task(1, 1), 4)
        .unwrap()
        .encode()
        .unwrap();
    bytes[0..4].copy_from_slice(&(-1i32).to_le_bytes());
    assert!(matches!(
        ResultHeader::decode(&bytes),
        Err(PlasmaError::Protocol(_))
    ));
}
