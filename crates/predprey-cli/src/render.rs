//! PNG frame dumps and animated GIF assembly.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageError, Rgba, RgbaImage};
use predprey_core::{Error, Occupant, Result, MAX_FRAME_SIDE};
use predprey_world::{Grid, Simulation, StepObserver};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info};

const FRAME_DELAY_MS: u32 = 100;

fn color(occupant: Occupant) -> Rgba<u8> {
    match occupant {
        Occupant::Empty => Rgba([0, 0, 0, 255]),
        Occupant::Predator => Rgba([220, 40, 40, 255]),
        Occupant::Prey => Rgba([40, 200, 60, 255]),
    }
}

fn image_err(err: ImageError) -> Error {
    Error::Render(err.to_string())
}

/// Paint the lattice with `scale`x`scale` pixels per site.
///
/// Fails if the frame side is zero or exceeds `MAX_FRAME_SIDE`.
pub fn render_grid(grid: &Grid, scale: u32) -> Result<RgbaImage> {
    let side = u32::try_from(grid.size())
        .ok()
        .and_then(|size| size.checked_mul(scale))
        .filter(|&side| side > 0 && side <= MAX_FRAME_SIDE)
        .ok_or_else(|| {
            Error::Render(format!(
                "{}x{} lattice at scale {} does not fit a {} pixel frame",
                grid.size(),
                grid.size(),
                scale,
                MAX_FRAME_SIDE
            ))
        })?;

    let mut image = RgbaImage::new(side, side);
    for (pos, occupant) in grid.iter() {
        let pixel = color(occupant);
        let x0 = pos.x as u32 * scale;
        let y0 = pos.y as u32 * scale;
        for py in y0..y0 + scale {
            for px in x0..x0 + scale {
                image.put_pixel(px, py, pixel);
            }
        }
    }
    Ok(image)
}

/// Renders the lattice every `interval` steps to PNG files, a GIF, or both.
pub struct FrameRenderer {
    frame_dir: Option<PathBuf>,
    gif: Option<GifEncoder<BufWriter<File>>>,
    interval: u64,
    scale: u32,
    frames_written: u64,
}

impl FrameRenderer {
    pub fn new(
        frame_dir: Option<PathBuf>,
        gif_path: Option<PathBuf>,
        interval: u64,
        scale: u32,
    ) -> Result<Self> {
        if let Some(dir) = &frame_dir {
            std::fs::create_dir_all(dir)?;
        }

        let gif = match gif_path {
            Some(path) => {
                let file = File::create(&path)?;
                let mut encoder = GifEncoder::new(BufWriter::new(file));
                encoder.set_repeat(Repeat::Infinite).map_err(image_err)?;
                info!("Writing animation to {:?}", path);
                Some(encoder)
            }
            None => None,
        };

        Ok(Self {
            frame_dir,
            gif,
            interval,
            scale,
            frames_written: 0,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.frame_dir.is_some() || self.gif.is_some()
    }

    fn render(&mut self, sim: &Simulation) -> Result<()> {
        let image = render_grid(sim.grid(), self.scale)?;

        if let Some(dir) = &self.frame_dir {
            let path = dir.join(format!("frame_{:06}.png", sim.time()));
            image.save(&path).map_err(image_err)?;
            debug!("Wrote {:?}", path);
        }

        if let Some(encoder) = self.gif.as_mut() {
            let delay = Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1);
            encoder
                .encode_frame(Frame::from_parts(image, 0, 0, delay))
                .map_err(image_err)?;
        }

        self.frames_written += 1;
        Ok(())
    }
}

impl StepObserver for FrameRenderer {
    fn observe(&mut self, sim: &Simulation) -> Result<()> {
        if self.is_enabled() && sim.time() % self.interval == 0 {
            self.render(sim)?;
        }
        Ok(())
    }

    fn finish(&mut self, sim: &Simulation) -> Result<()> {
        if self.is_enabled() && sim.time() % self.interval == 0 {
            self.render(sim)?;
        }
        // Dropping the encoder writes the GIF trailer.
        self.gif.take();
        if self.frames_written > 0 {
            info!("Rendered {} frames", self.frames_written);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predprey_core::{Position, SimulationParameters, Xorshift128Plus};
    use rand_core::SeedableRng;

    #[test]
    fn test_render_grid_scaling() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(Position::new(1, 0), Occupant::Predator);
        grid.set(Position::new(2, 2), Occupant::Prey);

        let image = render_grid(&grid, 2).unwrap();
        assert_eq!(image.dimensions(), (6, 6));
        assert_eq!(*image.get_pixel(0, 0), color(Occupant::Empty));
        assert_eq!(*image.get_pixel(2, 0), color(Occupant::Predator));
        assert_eq!(*image.get_pixel(3, 1), color(Occupant::Predator));
        assert_eq!(*image.get_pixel(5, 5), color(Occupant::Prey));
    }

    #[test]
    fn test_render_grid_rejects_oversized_frame() {
        let grid = Grid::new(2).unwrap();
        assert!(matches!(render_grid(&grid, 1 << 31), Err(Error::Render(_))));
        assert!(matches!(render_grid(&grid, u32::MAX), Err(Error::Render(_))));
        assert!(matches!(render_grid(&grid, 0), Err(Error::Render(_))));
        assert!(render_grid(&grid, MAX_FRAME_SIDE / 2 + 1).is_err());

        let image = render_grid(&grid, 8).unwrap();
        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn test_encoding_failure_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = render_grid(&Grid::new(1).unwrap(), 1).unwrap();
        let err = image.save(dir.path().join("frame.unknownformat")).unwrap_err();
        assert!(matches!(image_err(err), Error::Render(_)));
    }

    #[test]
    fn test_png_frames_and_gif() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        let gif = dir.path().join("run.gif");

        let params = SimulationParameters {
            size: 8,
            maxtime: 4,
            ..Default::default()
        };
        let mut rng = Xorshift128Plus::seed_from_u64(3);
        let mut sim = Simulation::init(params, &mut rng).unwrap();

        let mut renderer =
            FrameRenderer::new(Some(frames.clone()), Some(gif.clone()), 2, 1).unwrap();
        sim.run(&mut rng, &mut renderer).unwrap();

        assert_eq!(renderer.frames_written, 3);
        for t in [0, 2, 4] {
            assert!(frames.join(format!("frame_{:06}.png", t)).exists());
        }
        assert!(!frames.join("frame_000001.png").exists());
        assert!(std::fs::metadata(&gif).unwrap().len() > 0);
    }

    #[test]
    fn test_disabled_renderer_is_inert() {
        let params = SimulationParameters {
            size: 4,
            maxtime: 2,
            ..Default::default()
        };
        let mut rng = Xorshift128Plus::seed_from_u64(4);
        let mut sim = Simulation::init(params, &mut rng).unwrap();
        let mut renderer = FrameRenderer::new(None, None, 1, 1).unwrap();
        sim.run(&mut rng, &mut renderer).unwrap();
        assert_eq!(renderer.frames_written, 0);
    }
}
