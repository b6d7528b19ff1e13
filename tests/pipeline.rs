//! End-to-end runs: model file on disk -> render loop -> sink.

use std::fs;
use std::io::BufReader;

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use quadspin::colors;
use quadspin::prelude::*;

const SQUARE: &str = "\
# one quad facing -z
v -10 -10 -1
v 10 -10 -1
v 10 10 -1
v -10 10 -1
f 1 2 3 4
";

const CUBE: &str = "\
o cube
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
vt 0 0
s off
f 1/1 2/1 3/1 4/1
f 5/1 8/1 7/1 6/1
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
f 1 2 3
";

fn write_model(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_loads_model_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_model(&dir, "cube.obj", CUBE);

    let mesh = Mesh::from_obj(&path).unwrap();
    assert_eq!(mesh.points().len(), 8);
    assert_eq!(mesh.faces().len(), 6);
    assert_eq!(mesh.normals().len(), 6);
    assert_eq!(mesh.stats().skipped_faces, 1);
    assert!(mesh.stats().derived_normals);
    assert_eq!(mesh.faces()[2].indices(), [0, 4, 5, 1]);
}

#[test]
fn test_missing_model_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Mesh::from_obj(dir.path().join("nope.obj")).unwrap_err();
    assert!(matches!(err, quadspin::ParseError::FileNotFound { .. }));
}

#[test]
fn test_single_quad_footprint() {
    let mesh = Mesh::from_obj_str(SQUARE).unwrap();
    assert_eq!(mesh.normals().len(), 1);

    let mut config = RenderConfig::new();
    config.set_viewport(200, 200).set_step_degrees(0.0);
    let engine = Engine::new(mesh, &config);

    let (report, frames) = RenderLoop::new(engine, StopToken::new())
        .with_frame_limit(Some(1))
        .run(MemorySink::new())
        .unwrap();
    assert_eq!(report.frames, 1);

    // Edge-on normal, at the farthest depth: shade 127.
    let filled = colors::to_rgba(colors::blend_over(colors::grey(127), colors::BACKGROUND));
    let background = colors::to_rgba(colors::BACKGROUND);

    let frame = &frames[0];
    for (x, y, pixel) in frame.enumerate_pixels() {
        let inside = (90..110).contains(&x) && (90..110).contains(&y);
        let expected = if inside { filled } else { background };
        assert_eq!(pixel.0, expected, "pixel ({x}, {y})");
    }
}

#[test]
fn test_spinning_cube_changes_between_frames() {
    let mesh = Mesh::from_obj_str(CUBE).unwrap();
    let mut config = RenderConfig::new();
    config.set_viewport(64, 64).set_offset(32.0).set_step_degrees(15.0);

    // Scale the unit cube up so it covers a useful number of pixels.
    let points = mesh.points().iter().map(|&p| p * 20.0).collect();
    let mesh = Mesh::new(points, Vec::new(), mesh.faces().to_vec()).unwrap();

    let engine = Engine::new(mesh, &config);
    let (_, frames) = RenderLoop::new(engine, StopToken::new())
        .with_frame_limit(Some(3))
        .run(MemorySink::new())
        .unwrap();

    assert_eq!(frames.len(), 3);
    assert_ne!(frames[0], frames[1]);
    // Every stored pixel stays opaque.
    assert!(frames.iter().all(|f| f.pixels().all(|p| p.0[3] == 255)));
}

#[test]
fn test_stop_from_another_thread() {
    let mesh = Mesh::from_obj_str(CUBE).unwrap();
    let mut config = RenderConfig::new();
    config.set_viewport(32, 32);
    let engine = Engine::new(mesh, &config);

    let stop = StopToken::new();
    let exchange = FrameExchange::new(32, 32);
    let handle = RenderLoop::new(engine, stop.clone())
        .with_exchange(exchange.clone())
        .spawn(MemorySink::new())
        .unwrap();

    while exchange.generation() < 5 {
        std::thread::yield_now();
    }
    stop.stop();

    let (report, frames) = handle.join().unwrap().unwrap();
    assert!(report.frames >= 5);
    assert_eq!(frames.len() as u64, report.frames);
}

#[test]
fn test_gif_has_one_frame_per_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(&dir, "square.obj", SQUARE);
    let output = dir.path().join("spin.gif");

    let mut config = RenderConfig::new();
    config
        .set_viewport(120, 120)
        .set_offset(60.0)
        .set_step_degrees(10.0)
        .set_frame_limit(Some(6))
        .set_output(&output);

    let mesh = Mesh::from_obj(&model).unwrap();
    let sink = GifSink::new(config.output()).with_delay_ms(config.frame_delay_ms());
    let (report, gif) = RenderLoop::new(Engine::new(mesh, &config), StopToken::new())
        .with_frame_limit(config.frame_limit())
        .run(sink)
        .unwrap();

    assert_eq!(report.frames, 6);
    assert_eq!(gif.frames, 6);
    assert_eq!(gif.path, output);

    let file = BufReader::new(fs::File::open(&output).unwrap());
    let decoded = GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(decoded.len(), 6);
    assert_eq!(decoded[0].buffer().dimensions(), (120, 120));
}
