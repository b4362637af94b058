//! Color schemes: discrete health and risk palettes plus a multi-stop
//! interpolation engine for continuous maps.

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

// ─── Vegetation health classes ─────────────────────────────────────────

/// NDVI health band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthClass {
    /// NDVI ≤ 0
    BareSoil,
    /// 0 < NDVI ≤ 0.2
    Stressed,
    /// 0.2 < NDVI ≤ 0.5
    Moderate,
    /// NDVI > 0.5
    Healthy,
}

impl HealthClass {
    pub const ALL: &[HealthClass] = &[
        Self::BareSoil,
        Self::Stressed,
        Self::Moderate,
        Self::Healthy,
    ];

    /// Band an NDVI value falls in. NaN is treated as bare soil.
    pub fn from_ndvi(ndvi: f32) -> Self {
        if ndvi > 0.5 {
            Self::Healthy
        } else if ndvi > 0.2 {
            Self::Moderate
        } else if ndvi > 0.0 {
            Self::Stressed
        } else {
            Self::BareSoil
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Self::BareSoil => Rgb::new(139, 69, 19),
            Self::Stressed => Rgb::new(255, 255, 0),
            Self::Moderate => Rgb::new(144, 238, 144),
            Self::Healthy => Rgb::new(0, 128, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BareSoil => "bare soil",
            Self::Stressed => "stressed",
            Self::Moderate => "moderate",
            Self::Healthy => "healthy",
        }
    }
}

// ─── Risk classes ──────────────────────────────────────────────────────

/// Palette for risk class ids; ids past the end cycle through it.
const RISK_PALETTE: &[Rgb] = &[
    Rgb::new(0, 128, 0),    // 0: healthy
    Rgb::new(255, 200, 65), // 1: stress
    Rgb::new(255, 85, 0),   // 2: pest risk
    Rgb::new(196, 0, 0),    // 3: disease
    Rgb::new(132, 0, 168),
    Rgb::new(0, 92, 230),
];

/// Color of a risk class id
pub fn risk_color(class_id: u8) -> Rgb {
    RISK_PALETTE[class_id as usize % RISK_PALETTE.len()]
}

// ─── Continuous schemes ────────────────────────────────────────────────

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Continuous color schemes for index and confidence maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Brown -> Yellow -> Green (vegetation indices)
    Ndvi,
    /// Blue -> White -> Red (MSI, divergent data)
    BlueWhiteRed,
    /// Black -> White
    Grayscale,
    /// Yellow -> Orange -> Red -> Purple (confidence)
    Heat,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[
        Self::Ndvi,
        Self::BlueWhiteRed,
        Self::Grayscale,
        Self::Heat,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ndvi => "NDVI",
            Self::BlueWhiteRed => "Blue-White-Red",
            Self::Grayscale => "Grayscale",
            Self::Heat => "Heat",
        }
    }
}

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const BLUE_WHITE_RED_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

const HEAT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 212),
    ColorStop::new(0.25, 254, 217, 142),
    ColorStop::new(0.50, 254, 153, 41),
    ColorStop::new(0.75, 204, 76, 2),
    ColorStop::new(1.00, 102, 37, 6),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Values outside the range clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::BlueWhiteRed => multi_stop(BLUE_WHITE_RED_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Heat => multi_stop(HEAT_STOPS, t),
    }
}
