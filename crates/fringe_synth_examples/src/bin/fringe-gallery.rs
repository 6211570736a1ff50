use fringe_synth::prelude::*;
use fringe_synth_examples::{init_tracing, save_frame_png};
use glam::IVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // One circle per fringe count 0..=8 on the top row, blobs of growing radius below.
    let cell = 200;
    let radius = 80;
    let mut frame = Frame::blank(cell * 9, cell * 2);

    for n in 0..9u32 {
        let circle = Circle {
            position: IVec2::new((n * cell + cell / 2) as i32, (cell / 2) as i32),
            radius,
            fringe_count: n,
            intensity: 1.0,
            fill_level: 200,
        };
        render_circle(&mut frame, &circle);
    }

    let mut rng = StdRng::seed_from_u64(9);
    for i in 0..9u32 {
        let blob = Blob {
            position: IVec2::new((i * cell + cell / 2) as i32, (cell + cell / 2) as i32),
            radius: 20 + 8 * i as i32,
            color: Bgr::new(200, 150, 60),
            intensity: 1.0,
        };
        render_blob(&mut frame, &blob, &mut rng);
    }

    let blurred = gaussian_blur(&frame, &BlurConfig::default());
    save_frame_png(&frame, "fringe-gallery.png")?;
    save_frame_png(&blurred, "fringe-gallery-blurred.png")?;
    Ok(())
}
