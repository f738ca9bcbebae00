//! TIM2 texture container writer
//!
//! Writes single-picture, 32-bit true-color TIM2 files as embedded in PMO
//! models. Alpha is stored in the GS range (0 - 128).

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};

pub const MAGIC: &[u8; 4] = b"TIM2";
pub const FORMAT_VERSION: u8 = 4;
pub const FILE_HEADER_SIZE: usize = 0x10;
pub const PICTURE_HEADER_SIZE: usize = 0x30;
/// Largest edge the GS can address (TW/TH are log2 in 4 bits, capped at 10).
pub const MAX_DIMENSION: u32 = 1024;

const IMAGE_TYPE_RGBA32: u8 = 3;
const PSM_CT32: u64 = 0;

/// Encode RGBA8 pixels as a TIM2 file.
///
/// # Errors
/// Returns an error if the dimensions are outside the GS range or the
/// pixel buffer does not match them.
pub fn encode_rgba32(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    for edge in [width, height] {
        if edge == 0 || edge > MAX_DIMENSION {
            return Err(Error::CapacityExceeded {
                what: "texture dimension",
                count: edge as usize,
                max: MAX_DIMENSION as usize,
            });
        }
    }
    let image_size = width as usize * height as usize * 4;
    if rgba.len() != image_size {
        return Err(Error::malformed(format!(
            "{width}x{height} texture needs {image_size} bytes, got {}",
            rgba.len()
        )));
    }

    let mut output = Vec::with_capacity(FILE_HEADER_SIZE + PICTURE_HEADER_SIZE + image_size);

    // File header
    output.extend_from_slice(MAGIC);
    output.write_u8(FORMAT_VERSION)?;
    output.write_u8(0)?; // 16-byte alignment
    output.write_u16::<LittleEndian>(1)?;
    output.extend_from_slice(&[0u8; 8]);

    // Picture header
    output.write_u32::<LittleEndian>((PICTURE_HEADER_SIZE + image_size) as u32)?;
    output.write_u32::<LittleEndian>(0)?; // CLUT size
    output.write_u32::<LittleEndian>(image_size as u32)?;
    output.write_u16::<LittleEndian>(PICTURE_HEADER_SIZE as u16)?;
    output.write_u16::<LittleEndian>(0)?; // CLUT colors
    output.write_u8(0)?; // picture format
    output.write_u8(1)?; // mipmap count
    output.write_u8(0)?; // CLUT type
    output.write_u8(IMAGE_TYPE_RGBA32)?;
    output.write_u16::<LittleEndian>(width as u16)?;
    output.write_u16::<LittleEndian>(height as u16)?;
    output.write_u64::<LittleEndian>(gs_tex0(width, height))?;
    output.write_u64::<LittleEndian>(0)?; // GsTex1
    output.write_u32::<LittleEndian>(0)?; // GsRegs
    output.write_u32::<LittleEndian>(0)?; // GsTexClut

    for pixel in rgba.chunks_exact(4) {
        output.extend_from_slice(&pixel[..3]);
        output.push(((u16::from(pixel[3]) + 1) / 2) as u8);
    }

    Ok(output)
}

/// GS `TEX0` register for a CT32 texture at buffer base 0.
#[must_use]
pub fn gs_tex0(width: u32, height: u32) -> u64 {
    let tbw = u64::from(width.div_ceil(64));
    let tw = u64::from(log2_ceil(width));
    let th = u64::from(log2_ceil(height));
    let tcc = 1u64; // RGBA
    (tbw << 14) | (PSM_CT32 << 20) | (tw << 26) | (th << 30) | (tcc << 34)
}

fn log2_ceil(value: u32) -> u32 {
    value.next_power_of_two().trailing_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_fields() {
        let data = encode_rgba32(2, 2, &[255; 16]).unwrap();
        assert_eq!(&data[0..4], b"TIM2");
        assert_eq!(data[4], 4);
        assert_eq!(u16::from_le_bytes([data[6], data[7]]), 1);
        assert_eq!(data.len(), 0x10 + 0x30 + 16);
        // total size, image size
        assert_eq!(u32::from_le_bytes(data[0x10..0x14].try_into().unwrap()), 0x30 + 16);
        assert_eq!(u32::from_le_bytes(data[0x18..0x1C].try_into().unwrap()), 16);
        assert_eq!(data[0x23], 3);
    }

    #[test]
    fn test_alpha_halved() {
        let data = encode_rgba32(1, 1, &[10, 20, 30, 255]).unwrap();
        assert_eq!(&data[0x40..0x44], &[10, 20, 30, 128]);
        let data = encode_rgba32(1, 1, &[0, 0, 0, 0]).unwrap();
        assert_eq!(data[0x43], 0);
    }

    #[test]
    fn test_gs_tex0() {
        let tex0 = gs_tex0(256, 128);
        assert_eq!((tex0 >> 14) & 0x3F, 4);
        assert_eq!((tex0 >> 26) & 0xF, 8);
        assert_eq!((tex0 >> 30) & 0xF, 7);
        assert_eq!((tex0 >> 34) & 1, 1);
        // Non power of two rounds up
        assert_eq!((gs_tex0(100, 1) >> 26) & 0xF, 7);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            encode_rgba32(2048, 1, &[]),
            Err(Error::CapacityExceeded { .. })
        ));
        assert!(matches!(
            encode_rgba32(2, 2, &[0; 4]),
            Err(Error::MalformedInput { .. })
        ));
    }
}
