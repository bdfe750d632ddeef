use super::*;

#[test]
fn bbox_parses_four_numbers() {
    let bounds = parse_bbox("0, 0, 10.5, 5").unwrap();
    assert_eq!(bounds, Bounds::new(0.0, 0.0, 10.5, 5.0));
}

#[test]
fn bbox_normalizes_reversed_corners() {
    let bounds = parse_bbox("10,5,-2,0").unwrap();
    assert_eq!(bounds, Bounds::new(-2.0, 0.0, 10.0, 5.0));
}

#[test]
fn bbox_rejects_wrong_arity() {
    assert!(matches!(parse_bbox("1,2,3"), Err(CliError::InvalidBbox(_))));
    assert!(matches!(parse_bbox("1,2,3,4,5"), Err(CliError::InvalidBbox(_))));
}

#[test]
fn bbox_rejects_non_numbers() {
    let err = parse_bbox("a,b,c,d").unwrap_err();
    assert!(err.to_string().contains("a,b,c,d"));
    assert!(matches!(parse_bbox("0,0,inf,1"), Err(CliError::InvalidBbox(_))));
}

#[test]
fn missing_config_file_is_load_error() {
    let err = load_config(Some(Path::new("/definitely/not/config.json"))).unwrap_err();
    assert!(matches!(err, CliError::Load(LoadError::Io { .. })));
}

#[test]
fn cli_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from(["draftboard", "hit", "scene.json", "--x", "-4.5", "--y", "-1"]).unwrap();
    match cli.command {
        Command::Hit { x, y, radius, .. } => {
            assert!((x + 4.5).abs() < 1e-12);
            assert!((y + 1.0).abs() < 1e-12);
            assert!(radius.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn cli_query_takes_bbox() {
    let cli = Cli::try_parse_from(["draftboard", "query", "scene.json", "--bbox", "-1,-1,1,1"]).unwrap();
    assert!(matches!(cli.command, Command::Query { ref bbox, .. } if bbox == "-1,-1,1,1"));
}

#[test]
fn default_hit_radius_is_pixel_slop_at_unit_scale() {
    let config = CanvasConfig { hit_radius_px: 8.0, ..CanvasConfig::default() };
    assert!((default_hit_radius(&config) - 8.0).abs() < 1e-12);
}

#[test]
fn default_hit_radius_follows_scale_floor() {
    let config = CanvasConfig { hit_radius_px: 8.0, min_scale: 2.0, max_scale: 4.0, ..CanvasConfig::default() };
    assert!((default_hit_radius(&config) - 4.0).abs() < 1e-12);
}
