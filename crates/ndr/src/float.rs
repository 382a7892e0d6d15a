//! Floating point wire formats
//!
//! NDR lets the sender pick one of four floating point representations in
//! its data representation label. Conversion is a pure bit transformation
//! between the host's IEEE 754 values and the wire word:
//!
//! | Format | 32-bit layout                         | 64-bit layout                         |
//! |--------|---------------------------------------|---------------------------------------|
//! | IEEE   | binary32                              | binary64                              |
//! | VAX    | F_floating (8-bit exp, bias 128)      | G_floating (11-bit exp, bias 1024)    |
//! | Cray   | high half of the 64-bit form          | 15-bit exp (bias 16384), 48-bit frac  |
//! | IBM    | 7-bit base-16 exp (bias 64), 24-bit   | 7-bit base-16 exp (bias 64), 56-bit   |
//!
//! VAX words are stored as PDP-11 style 16-bit words with the word holding
//! sign and exponent first, so the wire integer is the word sequence read
//! least significant word first. The codec then applies the stream byte
//! order to that integer like any other primitive.
//!
//! Only IEEE is lossless. The other formats have different exponent ranges
//! and mantissa widths: values outside the range saturate or flush to zero,
//! and precision is rounded to the narrower mantissa.

/// Floating point representation selected by a data representation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatFormat {
    #[default]
    Ieee,
    Vax,
    Cray,
    Ibm,
}

impl FloatFormat {
    /// Wire word for a 32-bit float
    pub fn f32_bits(self, value: f32) -> u32 {
        match self {
            FloatFormat::Ieee => value.to_bits(),
            FloatFormat::Vax => vax_ffloat32_bits(value),
            FloatFormat::Cray => cray_float32_bits(value),
            FloatFormat::Ibm => ibm_float32_bits(value),
        }
    }

    /// 32-bit float from its wire word
    pub fn f32_from_bits(self, bits: u32) -> f32 {
        match self {
            FloatFormat::Ieee => f32::from_bits(bits),
            FloatFormat::Vax => vax_ffloat32_from_bits(bits),
            FloatFormat::Cray => cray_float32_from_bits(bits),
            FloatFormat::Ibm => ibm_float32_from_bits(bits),
        }
    }

    /// Wire word for a 64-bit float
    pub fn f64_bits(self, value: f64) -> u64 {
        match self {
            FloatFormat::Ieee => value.to_bits(),
            FloatFormat::Vax => vax_gfloat64_bits(value),
            FloatFormat::Cray => cray_float64_bits(value),
            FloatFormat::Ibm => ibm_float64_bits(value),
        }
    }

    /// 64-bit float from its wire word
    pub fn f64_from_bits(self, bits: u64) -> f64 {
        match self {
            FloatFormat::Ieee => f64::from_bits(bits),
            FloatFormat::Vax => vax_gfloat64_from_bits(bits),
            FloatFormat::Cray => cray_float64_from_bits(bits),
            FloatFormat::Ibm => ibm_float64_from_bits(bits),
        }
    }
}

const FRACTION_BITS_64: u32 = 52;
const FRACTION_MASK_64: u64 = (1 << FRACTION_BITS_64) - 1;

/// Splits a finite, non-zero value into `(negative, exponent, significand)`
/// with `|value| = significand * 2^(exponent - 52)` and the significand's top
/// bit at position 52. Subnormals are normalized.
fn unpack(value: f64) -> (bool, i32, u64) {
    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> FRACTION_BITS_64) & 0x7ff) as i32;
    let fraction = bits & FRACTION_MASK_64;
    if biased == 0 {
        let shift = fraction.leading_zeros() as i32 - 11;
        (negative, -1022 - shift, fraction << shift)
    } else {
        (negative, biased - 1023, fraction | (1 << FRACTION_BITS_64))
    }
}

/// `±significand * 2^exponent`, rounded once into binary64.
fn pack(negative: bool, significand: u64, exponent: i32) -> f64 {
    let magnitude = scale(significand as f64, exponent);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn scale(mut value: f64, mut exponent: i32) -> f64 {
    while exponent > 1023 {
        value *= pow2(1023);
        exponent -= 1023;
        if value.is_infinite() {
            return value;
        }
    }
    while exponent < -1022 {
        value *= pow2(-1022);
        exponent += 1022;
        if value == 0.0 {
            return value;
        }
    }
    value * pow2(exponent)
}

/// Exact power of two for exponents in the binary64 normal range.
fn pow2(exponent: i32) -> f64 {
    f64::from_bits(((exponent + 1023) as u64) << FRACTION_BITS_64)
}

/// Right shift rounding half up.
fn round_shift(value: u64, shift: u32) -> u64 {
    match shift {
        0 => value,
        s if s >= 64 => 0,
        _ => {
            let half = 1u64 << (shift - 1);
            (value >> shift) + u64::from(value & ((half << 1) - 1) >= half)
        }
    }
}

/// Rescales a 53-bit significand to `width` bits, rounding when narrowing.
fn resize_significand(significand: u64, width: u32) -> u64 {
    if width >= 53 {
        significand << (width - 53)
    } else {
        round_shift(significand, 53 - width)
    }
}

// VAX F_floating / G_floating
//
// Both store a hidden-bit fraction `0.1fff...` so a VAX exponent is the IEEE
// unbiased exponent plus one plus the VAX bias. An exponent field of zero
// is true zero when the sign is clear and a reserved operand otherwise.

const VAX_F_BIAS: i32 = 128;
const VAX_G_BIAS: i32 = 1024;

/// Converts to VAX F_floating
pub fn vax_ffloat32_bits(value: f32) -> u32 {
    let value = f64::from(value);
    if value.is_nan() {
        return 0x0000_8000;
    }
    if value == 0.0 {
        return 0;
    }
    let (negative, exponent, significand) = unpack(value);
    let sign = u32::from(negative) << 15;
    if value.is_infinite() {
        return 0xffff_0000 | sign | 0x7fff;
    }

    let mut fraction = resize_significand(significand, 24);
    let mut vax_exponent = exponent + 1 + VAX_F_BIAS;
    if fraction >> 24 != 0 {
        fraction >>= 1;
        vax_exponent += 1;
    }
    if vax_exponent <= 0 {
        return 0;
    }
    if vax_exponent > 0xff {
        return 0xffff_0000 | sign | 0x7fff;
    }

    let fraction = (fraction as u32) & 0x007f_ffff;
    let high_word = sign | ((vax_exponent as u32) << 7) | (fraction >> 16);
    let low_word = fraction & 0xffff;
    (low_word << 16) | high_word
}

/// Converts from VAX F_floating
pub fn vax_ffloat32_from_bits(bits: u32) -> f32 {
    let high_word = bits & 0xffff;
    let low_word = bits >> 16;
    let negative = high_word & 0x8000 != 0;
    let vax_exponent = ((high_word >> 7) & 0xff) as i32;
    if vax_exponent == 0 {
        return if negative { f32::NAN } else { 0.0 };
    }
    let fraction = (((high_word & 0x7f) << 16) | low_word) as u64 | (1 << 23);
    pack(negative, fraction, vax_exponent - VAX_F_BIAS - 24) as f32
}

/// Converts to VAX G_floating
pub fn vax_gfloat64_bits(value: f64) -> u64 {
    if value.is_nan() {
        return 0x8000;
    }
    if value == 0.0 {
        return 0;
    }
    let (negative, exponent, significand) = unpack(value);
    let sign = u64::from(negative) << 15;
    let saturated = 0xffff_ffff_ffff_0000 | sign | 0x7fff;
    if value.is_infinite() {
        return saturated;
    }

    let vax_exponent = exponent + 1 + VAX_G_BIAS;
    if vax_exponent <= 0 {
        return 0;
    }
    if vax_exponent > 0x7ff {
        return saturated;
    }

    let fraction = significand & FRACTION_MASK_64;
    let words = [
        sign | ((vax_exponent as u64) << 4) | (fraction >> 48),
        (fraction >> 32) & 0xffff,
        (fraction >> 16) & 0xffff,
        fraction & 0xffff,
    ];
    words
        .iter()
        .enumerate()
        .fold(0, |acc, (i, word)| acc | (word << (16 * i)))
}

/// Converts from VAX G_floating
pub fn vax_gfloat64_from_bits(bits: u64) -> f64 {
    let word = |i: u32| (bits >> (16 * i)) & 0xffff;
    let high_word = word(0);
    let negative = high_word & 0x8000 != 0;
    let vax_exponent = ((high_word >> 4) & 0x7ff) as i32;
    if vax_exponent == 0 {
        return if negative { f64::NAN } else { 0.0 };
    }
    let fraction = ((high_word & 0xf) << 48) | (word(1) << 32) | (word(2) << 16) | word(3);
    pack(negative, fraction | (1 << 52), vax_exponent - VAX_G_BIAS - 53)
}

// Cray
//
// Sign, 15-bit exponent biased by 0x4000, then an explicit fraction
// `0.1fff...` with no hidden bit. Exponents at or above 0x6000 signal
// overflow on Cray hardware and are read back as infinity.

const CRAY_BIAS: i32 = 0x4000;
const CRAY_OVERFLOW: i32 = 0x6000;

fn cray_bits(value: f64, fraction_bits: u32) -> u64 {
    let sign_shift = fraction_bits + 15;
    if value == 0.0 {
        return 0;
    }
    let negative = value.is_sign_negative();
    let sign = u64::from(negative) << sign_shift;
    let overflow = sign | ((CRAY_OVERFLOW as u64) << fraction_bits) | (1 << (fraction_bits - 1));
    if !value.is_finite() {
        return overflow;
    }

    let (_, exponent, significand) = unpack(value);
    let mut fraction = resize_significand(significand, fraction_bits);
    let mut cray_exponent = exponent + 1 + CRAY_BIAS;
    if fraction >> fraction_bits != 0 {
        fraction >>= 1;
        cray_exponent += 1;
    }
    if cray_exponent <= 0 {
        return 0;
    }
    if cray_exponent >= CRAY_OVERFLOW {
        return overflow;
    }
    sign | ((cray_exponent as u64) << fraction_bits) | fraction
}

fn cray_from_bits(bits: u64, fraction_bits: u32) -> f64 {
    let negative = (bits >> (fraction_bits + 15)) & 1 != 0;
    let cray_exponent = ((bits >> fraction_bits) & 0x7fff) as i32;
    let fraction = bits & ((1 << fraction_bits) - 1);
    if cray_exponent >= CRAY_OVERFLOW {
        return if negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if fraction == 0 {
        return if negative { -0.0 } else { 0.0 };
    }
    pack(negative, fraction, cray_exponent - CRAY_BIAS - fraction_bits as i32)
}

/// Converts to the 32-bit Cray form (sign, exponent, 16 fraction bits)
pub fn cray_float32_bits(value: f32) -> u32 {
    cray_bits(f64::from(value), 16) as u32
}

/// Converts from the 32-bit Cray form
pub fn cray_float32_from_bits(bits: u32) -> f32 {
    cray_from_bits(u64::from(bits), 16) as f32
}

/// Converts to Cray single precision (64-bit word)
pub fn cray_float64_bits(value: f64) -> u64 {
    cray_bits(value, 48)
}

/// Converts from Cray single precision (64-bit word)
pub fn cray_float64_from_bits(bits: u64) -> f64 {
    cray_from_bits(bits, 48)
}

// IBM System/360 hexadecimal floating point
//
// Sign, 7-bit base-16 exponent biased by 64, fraction `0.ffff...` normalized
// to a non-zero leading hex digit, so up to three leading fraction bits may
// be zero.

const IBM_BIAS: i32 = 64;

fn ibm_bits(value: f64, fraction_bits: u32) -> u64 {
    let sign_shift = fraction_bits + 7;
    if value == 0.0 || value.is_nan() {
        return 0;
    }
    let negative = value.is_sign_negative();
    let sign = u64::from(negative) << sign_shift;
    let saturated = sign | (0x7f << fraction_bits) | ((1 << fraction_bits) - 1);
    if value.is_infinite() {
        return saturated;
    }

    // |value| = 0.1fff * 2^binary_exponent, moved onto a base-16 boundary
    let (_, exponent, significand) = unpack(value);
    let binary_exponent = exponent + 1;
    let mut hex_exponent = (binary_exponent + 3).div_euclid(4);
    let shift = (4 * hex_exponent - binary_exponent) as u32;

    let narrowing = 53 + shift as i32 - fraction_bits as i32;
    let mut fraction = if narrowing >= 0 {
        round_shift(significand, narrowing as u32)
    } else {
        significand << -narrowing
    };
    if fraction >> fraction_bits != 0 {
        fraction >>= 4;
        hex_exponent += 1;
    }

    let mut ibm_exponent = hex_exponent + IBM_BIAS;
    while ibm_exponent < 0 && fraction != 0 {
        fraction >>= 4;
        ibm_exponent += 1;
    }
    if fraction == 0 {
        return 0;
    }
    if ibm_exponent > 0x7f {
        return saturated;
    }
    sign | ((ibm_exponent as u64) << fraction_bits) | fraction
}

fn ibm_from_bits(bits: u64, fraction_bits: u32) -> f64 {
    let negative = (bits >> (fraction_bits + 7)) & 1 != 0;
    let ibm_exponent = ((bits >> fraction_bits) & 0x7f) as i32;
    let fraction = bits & ((1 << fraction_bits) - 1);
    if fraction == 0 {
        return if negative { -0.0 } else { 0.0 };
    }
    // leading zero hex digits are legal; pack normalizes them away
    pack(negative, fraction, 4 * (ibm_exponent - IBM_BIAS) - fraction_bits as i32)
}

/// Converts to IBM short hexadecimal floating point
pub fn ibm_float32_bits(value: f32) -> u32 {
    ibm_bits(f64::from(value), 24) as u32
}

/// Converts from IBM short hexadecimal floating point
pub fn ibm_float32_from_bits(bits: u32) -> f32 {
    ibm_from_bits(u64::from(bits), 24) as f32
}

/// Converts to IBM long hexadecimal floating point
pub fn ibm_float64_bits(value: f64) -> u64 {
    ibm_bits(value, 56)
}

/// Converts from IBM long hexadecimal floating point
pub fn ibm_float64_from_bits(bits: u64) -> f64 {
    ibm_from_bits(bits, 56)
}
