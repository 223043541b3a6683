use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kanade_core::engine::config::EngineConfig;
use kanade_core::io::ser::SerReader;
use kanade_core::pyramid::{level_count, CropWindow};

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = SerReader::open(&args.file)?;
    let header = &reader.header;
    let format = header.image_format();

    println!("File:        {}", args.file.display());
    println!("Frames:      {}", reader.frame_count());
    println!("Dimensions:  {}x{}", header.width, header.height);
    println!("Bit depth:   {}", header.pixel_depth);
    println!("Color mode:  {}", header.color());
    println!("Engine:      {}", format.pixel_format);

    if !header.observer.is_empty() {
        println!("Observer:    {}", header.observer);
    }
    if !header.telescope.is_empty() {
        println!("Telescope:   {}", header.telescope);
    }
    if !header.instrument.is_empty() {
        println!("Instrument:  {}", header.instrument);
    }
    println!(
        "Timestamps:  {}",
        if reader.timestamps().is_some() { "yes" } else { "no" }
    );

    let frame_bytes = header.frame_byte_size()?;
    let total_mb = (frame_bytes * reader.frame_count()) as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);

    match level_count(format.width, format.height, &EngineConfig::default()) {
        Ok(levels) => {
            let crop = CropWindow::centred(format.width, format.height, levels);
            println!(
                "Pyramid:     {} levels over {}x{} at ({}, {})",
                levels, crop.width, crop.height, crop.x, crop.y
            );
        }
        Err(e) => println!("Pyramid:     unavailable ({e})"),
    }

    Ok(())
}
