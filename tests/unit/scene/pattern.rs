use super::*;

fn cfg(kind: PatternKind) -> PatternConfig {
    PatternConfig {
        enabled: true,
        kind,
        color: "#ffffff".into(),
        ..PatternConfig::default()
    }
}

#[test]
fn tile_size_follows_spacing_and_scale() {
    let mut c = cfg(PatternKind::Dots);
    assert_eq!(tile_size(&c), 20);
    c.scale = 2.0;
    assert_eq!(tile_size(&c), 40);
    c.spacing = 1000.0;
    assert_eq!(tile_size(&c), 512);
}

#[test]
fn dots_sit_in_the_tile_center() {
    let t = pattern_tile(&cfg(PatternKind::Dots)).unwrap();
    assert_eq!((t.width(), t.height()), (20, 20));
    assert_eq!(t.pixel(10, 10)[3], 255);
    assert_eq!(t.pixel(1, 1)[3], 0);
}

#[test]
fn grid_draws_the_top_and_left_edges() {
    let t = pattern_tile(&cfg(PatternKind::Grid)).unwrap();
    assert_eq!(t.pixel(10, 0)[3], 255);
    assert_eq!(t.pixel(0, 10)[3], 255);
    assert_eq!(t.pixel(10, 10)[3], 0);
}

#[test]
fn lines_run_along_the_anti_diagonal() {
    let mut c = cfg(PatternKind::Lines);
    c.scale = 2.0;
    let t = pattern_tile(&c).unwrap();
    assert!(t.pixel(19, 20)[3] > 0 || t.pixel(20, 19)[3] > 0);
    assert!(t.pixel(20, 20)[3] > 0);
    assert_eq!(t.pixel(8, 8)[3], 0);
}

#[test]
fn cross_arms_meet_at_the_center() {
    let t = pattern_tile(&cfg(PatternKind::Cross)).unwrap();
    assert!(t.pixel(10, 10)[3] > 0);
    assert!(t.pixel(6, 10)[3] > 0 || t.pixel(6, 9)[3] > 0);
    assert_eq!(t.pixel(2, 2)[3], 0);
}

#[test]
fn blur_softens_the_motif() {
    let sharp = pattern_tile(&cfg(PatternKind::Dots)).unwrap();
    let mut c = cfg(PatternKind::Dots);
    c.blur = 3.0;
    let soft = pattern_tile(&c).unwrap();
    assert!(soft.pixel(10, 10)[3] < sharp.pixel(10, 10)[3]);
}

#[test]
fn unsupported_colors_are_rejected() {
    let mut c = cfg(PatternKind::Dots);
    c.color = "not-a-color".into();
    assert!(pattern_tile(&c).is_err());
}
