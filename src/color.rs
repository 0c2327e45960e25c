//! Colouring.  An escape time is scaled by a contrast factor and then
//! looked up on a fixed red, yellow, green, cyan, blue, black gradient.
//! The gradient is five linear ramps laid end to end, each 255 wide,
//! and anything past the last one is black.
use num::clamp;
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGB colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelColor {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl PixelColor {
    /// Constructor.
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        PixelColor { red, green, blue }
    }

    /// The colour of escape times past the end of the gradient.
    pub fn black() -> Self {
        PixelColor::new(0, 0, 0)
    }
}

// How one channel behaves over a segment of the gradient.
#[derive(Copy, Clone, Debug)]
enum Ramp {
    Off,
    Full,
    // g - offset
    Rise(i64),
    // top - g
    Fall(i64),
}

impl Ramp {
    fn at(self, g: i64) -> u8 {
        let v = match self {
            Ramp::Off => 0,
            Ramp::Full => 255,
            Ramp::Rise(offset) => g - offset,
            Ramp::Fall(top) => top - g,
        };
        clamp(v, 0, 255) as u8
    }
}

#[derive(Copy, Clone, Debug)]
struct Segment {
    upper: i64,
    red: Ramp,
    green: Ramp,
    blue: Ramp,
}

/// Breakpoints in ascending order.  A scaled escape time uses the
/// first segment whose upper bound it does not exceed.
const GRADIENT: [Segment; 5] = [
    Segment {
        upper: 255,
        red: Ramp::Full,
        green: Ramp::Rise(0),
        blue: Ramp::Off,
    },
    Segment {
        upper: 510,
        red: Ramp::Fall(510),
        green: Ramp::Full,
        blue: Ramp::Off,
    },
    Segment {
        upper: 765,
        red: Ramp::Off,
        green: Ramp::Full,
        blue: Ramp::Rise(510),
    },
    Segment {
        upper: 1020,
        red: Ramp::Off,
        green: Ramp::Fall(1020),
        blue: Ramp::Full,
    },
    Segment {
        upper: 1275,
        red: Ramp::Off,
        green: Ramp::Off,
        blue: Ramp::Fall(1275),
    },
];

/// Maps an escape time and a contrast multiplier to a colour.  The
/// product `g = iteration_count * contrast` selects a point on the
/// gradient.  A contrast of zero or below gives flat red.
pub fn color_for(iteration_count: u32, contrast: i32) -> PixelColor {
    let g = i64::from(iteration_count) * i64::from(contrast);
    GRADIENT
        .iter()
        .find(|segment| g <= segment.upper)
        .map(|segment| {
            PixelColor::new(segment.red.at(g), segment.green.at(g), segment.blue.at(g))
        })
        .unwrap_or_else(PixelColor::black)
}

/// The named contrast settings of the explorer.  Higher contrast walks
/// the gradient faster, so fewer iterations separate the colour bands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Contrast {
    /// Multiplier 50.
    High,
    /// Multiplier 25.
    Medium,
    /// Multiplier 10.
    Low,
    /// Any other multiplier.
    Custom(i32),
}

impl Contrast {
    /// The multiplier applied to escape times.
    pub fn multiplier(self) -> i32 {
        match self {
            Contrast::High => 50,
            Contrast::Medium => 25,
            Contrast::Low => 10,
            Contrast::Custom(m) => m,
        }
    }
}

impl Default for Contrast {
    fn default() -> Self {
        Contrast::Medium
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Contrast::High => write!(f, "high"),
            Contrast::Medium => write!(f, "medium"),
            Contrast::Low => write!(f, "low"),
            Contrast::Custom(m) => write!(f, "{}", m),
        }
    }
}

impl FromStr for Contrast {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hi" | "high" => Ok(Contrast::High),
            "med" | "medium" => Ok(Contrast::Medium),
            "low" => Ok(Contrast::Low),
            other => other
                .parse::<i32>()
                .map(Contrast::Custom)
                .map_err(|_| format!("Unknown contrast '{}': use hi, med, low or an integer", s)),
        }
    }
}

/// Holds the contrast used to colour a render pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorMapper {
    contrast: i32,
}

impl ColorMapper {
    /// Constructor.
    pub fn new(contrast: i32) -> Self {
        ColorMapper { contrast }
    }

    /// The contrast multiplier.
    pub fn contrast(&self) -> i32 {
        self.contrast
    }

    /// Replaces the contrast for subsequent passes.
    pub fn set_contrast(&mut self, contrast: i32) {
        self.contrast = contrast;
    }

    /// The colour of an escape time under this mapper's contrast.
    pub fn color_for(&self, iteration_count: u32) -> PixelColor {
        color_for(iteration_count, self.contrast)
    }
}

impl From<Contrast> for ColorMapper {
    fn from(contrast: Contrast) -> Self {
        ColorMapper::new(contrast.multiplier())
    }
}
