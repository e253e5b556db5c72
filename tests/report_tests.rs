mod common;

use common::*;
use heightmap_histogram::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn test_report_serializes_as_map() {
    let png = PngFixture::new(3, 2, GRAY, 8).encode(|x, _| vec![x as u16]);
    let value = serde_json::to_value(analyze(&png)).unwrap();

    assert_eq!(value["error"], json!(""));
    assert_eq!(value["width"], json!(3));
    assert_eq!(value["height"], json!(2));

    let histogram = value["histogram"].as_array().unwrap();
    assert_eq!(histogram.len(), HISTOGRAM_SIZE);
    assert_eq!(&histogram[..4], &[json!(2), json!(2), json!(2), json!(0)]);

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
}

#[test]
fn test_failed_report_serializes_error() {
    let value = serde_json::to_value(analyze(b"not a png")).unwrap();
    assert_eq!(value["error"], json!("File is not a PNG image."));
    assert_eq!(value["width"], json!(0));
    assert!(value["histogram"]
        .as_array()
        .unwrap()
        .iter()
        .all(|count| count == &Value::from(0)));
}

#[test]
fn test_into_result() {
    let png = PngFixture::new(2, 2, GRAY, 8).encode(|_, _| vec![5]);
    let map = analyze(&png).into_result().unwrap();
    assert_eq!(map.histogram.get(5), 4);

    assert_eq!(
        analyze(&[]).into_result(),
        Err("File is not a PNG image.".to_string())
    );
}

#[test]
fn test_classify_decoded_heightmap() {
    // 300 x 100 ramp: half sea, the rest spread over the whole height range
    let png = PngFixture::new(300, 100, GRAY, 8).encode(|x, _| {
        if x < 150 {
            vec![0]
        } else {
            vec![((x - 150) * 255 / 149) as u16]
        }
    });
    let map = decode_histogram(&png, &AnalyzeOptions::default()).unwrap();
    let classification = classify(&map);

    assert_eq!(
        classification,
        Classification {
            resolution: Resolution::Low,
            shape: Shape::Narrow,
            terrain_type: TerrainType::Mountainous,
        }
    );
    assert_eq!(
        serde_json::to_value(classification).unwrap(),
        json!({"resolution": "low", "shape": "narrow", "terrain-type": "mountainous"})
    );
}

#[test]
fn test_classify_flat_sixteen_level_map() {
    // 16-color height palette using only the two lowest land levels
    let palette: Vec<[u8; 3]> = (0..16).map(|i| [0, (i * 10) as u8, 200]).collect();
    let png = PngFixture::new(512, 512, INDEXED, 4)
        .palette(palette)
        .encode(|x, _| vec![1 + (x % 2) as u16]);
    let map = decode_histogram(&png, &AnalyzeOptions::default()).unwrap();

    assert_eq!(map.histogram.get(16), 512 * 256);
    assert_eq!(map.histogram.get(32), 512 * 256);
    assert_eq!(
        classify(&map),
        Classification {
            resolution: Resolution::Normal,
            shape: Shape::Square,
            terrain_type: TerrainType::VeryFlat,
        }
    );
}
