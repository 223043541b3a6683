use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use ndarray::ArrayView3;

use crate::error::{KanadeError, Result};
use crate::io::ser::{SerColor, SerHeader, FRAME_COUNT_OFFSET, SER_HEADER_SIZE, SER_MAGIC};
use crate::sample::Sample;

/// Streams frames into a SER file; the frame count is patched on finalize.
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frame_buf: Vec<u8>,
    frames_written: u32,
}

impl SerWriter {
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let frame_size = header.frame_byte_size()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frame_buf: Vec::with_capacity(frame_size),
            frames_written: 0,
        })
    }

    pub fn header(&self) -> &SerHeader {
        &self.header
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Write raw frame bytes (must match the header's frame size).
    pub fn write_raw_frame(&mut self, data: &[u8]) -> Result<()> {
        let expected = self.header.frame_byte_size()?;
        if data.len() != expected {
            return Err(KanadeError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        self.writer.write_all(data)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Encode a `(height, width, planes)` frame at the header's bit depth.
    pub fn write_frame<T: Sample>(&mut self, frame: ArrayView3<T>) -> Result<()> {
        let (h, w, planes) = frame.dim();
        let expected = (
            self.header.height as usize,
            self.header.width as usize,
            self.header.color().planes(),
        );
        if (h, w, planes) != expected {
            return Err(KanadeError::BufferSize {
                expected: expected.0 * expected.1 * expected.2,
                actual: h * w * planes,
            });
        }

        let max = self.header.max_value();
        let wide = self.header.bytes_per_sample() == 2;
        let little_endian = self.header.little_endian;
        let bgr = self.header.color() == SerColor::Bgr;

        self.frame_buf.clear();
        for y in 0..h {
            for x in 0..w {
                for plane in 0..planes {
                    let c = if bgr { planes - 1 - plane } else { plane };
                    let raw = (frame[[y, x, c]].to_unit().clamp(0.0, 1.0) * max).round();
                    if wide {
                        let v = raw as u16;
                        let bytes = if little_endian {
                            v.to_le_bytes()
                        } else {
                            v.to_be_bytes()
                        };
                        self.frame_buf.extend_from_slice(&bytes);
                    } else {
                        self.frame_buf.push(raw as u8);
                    }
                }
            }
        }
        self.writer.write_all(&self.frame_buf)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Write the optional timestamp trailer (one u64 per frame, little-endian).
    pub fn write_timestamps(&mut self, timestamps: &[u64]) -> Result<()> {
        for &ts in timestamps {
            self.writer.write_all(&ts.to_le_bytes())?;
        }
        Ok(())
    }

    /// Flush, and fix the header's frame count if fewer or more frames were written.
    pub fn finalize(mut self) -> Result<()> {
        if self.frames_written != self.header.frame_count {
            self.writer.seek(SeekFrom::Start(FRAME_COUNT_OFFSET))?;
            self.writer
                .write_all(&(self.frames_written as i32).to_le_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    w.write_all(SER_MAGIC)?;
    // LuID
    w.write_all(&0i32.to_le_bytes())?;
    w.write_all(&header.color_id.to_le_bytes())?;
    // 0 marks little-endian data, matching what capture tools write.
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    w.write_all(&(header.width as i32).to_le_bytes())?;
    w.write_all(&(header.height as i32).to_le_bytes())?;
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_all(&header.date_time.to_le_bytes())?;
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(14 + 7 * 4 + 3 * 40 + 2 * 8, SER_HEADER_SIZE);
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let mut field = vec![0u8; len];
    let bytes = s.as_bytes();
    let n = bytes.len().min(len);
    field[..n].copy_from_slice(&bytes[..n]);
    w.write_all(&field)?;
    Ok(())
}
