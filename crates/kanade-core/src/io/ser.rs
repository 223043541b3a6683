use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{KanadeError, Result};
use crate::frame::{ImageFormat, PixelFormat, SampleKind};
use crate::sample::Sample;

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Byte offset of the FrameCount field.
pub(crate) const FRAME_COUNT_OFFSET: u64 = 38;

/// Sensor layout recorded in the SER `ColorID` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerColor {
    Mono,
    /// Raw Bayer mosaic; registered as a single plane.
    Bayer(i32),
    Rgb,
    Bgr,
}

impl SerColor {
    pub fn from_id(id: i32) -> Self {
        match id {
            8..=19 => Self::Bayer(id),
            100 => Self::Rgb,
            101 => Self::Bgr,
            _ => Self::Mono,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::Mono => 0,
            Self::Bayer(id) => *id,
            Self::Rgb => 100,
            Self::Bgr => 101,
        }
    }

    pub fn planes(&self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => COLOR_CHANNEL_COUNT,
            _ => 1,
        }
    }
}

impl std::fmt::Display for SerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mono => write!(f, "Mono"),
            Self::Bayer(id) => write!(f, "Bayer (id {id})"),
            Self::Rgb => write!(f, "RGB"),
            Self::Bgr => write!(f, "BGR"),
        }
    }
}

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for frames of `format`; byte formats are written 8-bit, float
    /// formats 16-bit.
    pub fn for_format(format: ImageFormat, frame_count: u32) -> Self {
        let color_id = match format.components() {
            1 => SerColor::Mono.id(),
            _ => SerColor::Rgb.id(),
        };
        let pixel_depth = match format.pixel_format.sample_kind() {
            SampleKind::U8 => 8,
            SampleKind::F32 => 16,
        };
        Self {
            color_id,
            little_endian: true,
            width: format.width as u32,
            height: format.height as u32,
            pixel_depth,
            frame_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    pub fn color(&self) -> SerColor {
        SerColor::from_id(self.color_id)
    }

    /// Bytes per sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> Result<usize> {
        let bytes_per_pixel = self.color().planes() * self.bytes_per_sample();
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
            .ok_or_else(|| {
                KanadeError::InvalidSer(format!(
                    "Frame size overflows: {}x{} with {} bytes per pixel",
                    self.width, self.height, bytes_per_pixel
                ))
            })
    }

    /// Header plus every frame, excluding the timestamp trailer.
    pub fn data_end(&self) -> Result<usize> {
        self.frame_byte_size()?
            .checked_mul(self.frame_count as usize)
            .and_then(|frames| frames.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| {
                KanadeError::InvalidSer(format!(
                    "Data size overflows for {} frames",
                    self.frame_count
                ))
            })
    }

    /// Largest raw sample value for the recorded bit depth.
    pub fn max_value(&self) -> f32 {
        ((1u32 << self.pixel_depth.clamp(1, 16)) - 1) as f32
    }

    /// Engine format for this stream: 8-bit data stays bytes, deeper data
    /// is registered as normalised floats.
    pub fn image_format(&self) -> ImageFormat {
        let kind = if self.bytes_per_sample() == 1 {
            SampleKind::U8
        } else {
            SampleKind::F32
        };
        let pixel_format = PixelFormat::from_parts(kind, self.color().planes())
            .unwrap_or(PixelFormat::MonoF32);
        ImageFormat::new(self.width as usize, self.height as usize, pixel_format)
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
}

impl SerReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(KanadeError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(KanadeError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let expected = header.data_end()?;
        if mmap.len() < expected {
            return Err(KanadeError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Raw bytes of one frame, borrowed from the mapping.
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let total = self.frame_count();
        if index >= total {
            return Err(KanadeError::FrameIndexOutOfRange { index, total });
        }
        let size = self.header.frame_byte_size()?;
        let offset = SER_HEADER_SIZE + index * size;
        Ok(&self.mmap[offset..offset + size])
    }

    /// Decode one frame into a `(height, width, planes)` array, RGB order.
    pub fn read_frame<T: Sample>(&self, index: usize) -> Result<Array3<T>> {
        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let planes = self.header.color().planes();
        let bps = self.header.bytes_per_sample();
        let max = self.header.max_value();
        let little_endian = self.header.little_endian;
        let bgr = self.header.color() == SerColor::Bgr;

        Ok(Array3::from_shape_fn((h, w, planes), |(y, x, c)| {
            let plane = if bgr { planes - 1 - c } else { c };
            let idx = ((y * w + x) * planes + plane) * bps;
            let value = if bps == 1 {
                raw[idx] as f32
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                if little_endian {
                    u16::from_le_bytes(pair) as f32
                } else {
                    u16::from_be_bytes(pair) as f32
                }
            };
            T::from_unit(value / max)
        }))
    }

    /// Per-frame timestamp from the optional trailer.
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        let trailer = self.header.data_end().ok()?;
        let offset = trailer.checked_add(index.checked_mul(8)?)?;
        let bytes = self.mmap.get(offset..offset + 8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    /// All timestamps, if the trailer covers every frame.
    pub fn timestamps(&self) -> Option<Vec<u64>> {
        (0..self.frame_count()).map(|i| self.timestamp(i)).collect()
    }

    /// Decode every frame in order.
    pub fn frames<T: Sample>(&self) -> impl Iterator<Item = Result<Array3<T>>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]);

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(KanadeError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(KanadeError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Most capture software writes 0 for little-endian data despite the
    // format description, so only an explicit 1 means big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}
