use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_terms() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
}

#[test]
fn split_secs_lands_on_exact_boundaries() {
    let fps = Fps::new(10, 1).unwrap();
    assert_eq!(fps.split_secs(0.7).0, 7);
    assert_eq!(fps.split_secs(1.2).0, 12);
    assert_eq!(fps.split_secs(2.3).0, 23);
}

#[test]
fn split_secs_fraction_is_half_open() {
    let fps = Fps::new(10, 1).unwrap();
    let (whole, frac) = fps.split_secs(0.25);
    assert_eq!(whole, 2);
    assert!((frac - 0.5).abs() < 1e-9);

    let (_, frac) = fps.split_secs(0.3);
    assert!((0.0..1.0).contains(&frac));
}

#[test]
fn split_secs_clamps_negative_and_nan() {
    let fps = Fps::new(12, 1).unwrap();
    assert_eq!(fps.split_secs(-1.0), (0, 0.0));
    assert_eq!(fps.split_secs(f64::NAN), (0, 0.0));
}

#[test]
fn position_orders_scene_major() {
    assert!(Position::new(1, 9) < Position::new(2, 1));
    assert_eq!(Position::START.to_string(), "1:1");
}
