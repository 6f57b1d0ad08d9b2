// Palettes and the explicit color cycle

const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c",
    "#98df8a", "#d62728", "#ff9896", "#9467bd", "#c5b0d5",
    "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f",
    "#c7c7c7", "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

// Evenly spaced stops of the viridis colormap
const VIRIDIS_STOPS: [(u8, u8, u8); 11] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x24, 0x75),
    (0x41, 0x44, 0x87),
    (0x35, 0x5f, 0x8d),
    (0x2a, 0x78, 0x8e),
    (0x21, 0x91, 0x8c),
    (0x22, 0xa8, 0x84),
    (0x44, 0xbf, 0x70),
    (0x7a, 0xd1, 0x51),
    (0xbd, 0xdf, 0x26),
    (0xfd, 0xe7, 0x25),
];

/// An ordered list of colors, as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    pub fn category10() -> Self {
        Self::from_slice(&CATEGORY10)
    }

    pub fn category20() -> Self {
        Self::from_slice(&CATEGORY20)
    }

    /// `n` colors sampled evenly from viridis, dark to light
    pub fn viridis(n: usize) -> Self {
        let colors = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                let (r, g, b) = sample_viridis(t);
                to_hex(r, g, b)
            })
            .collect();
        Self { colors }
    }

    fn from_slice(colors: &[&str]) -> Self {
        Self {
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.colors.get(idx).map(|c| c.as_str())
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    fn truncated(mut self, n: usize) -> Self {
        self.colors.truncate(n);
        self
    }
}

/// Deterministic palette with exactly `size` colors
pub fn palette_of(size: usize) -> ColorPalette {
    match size {
        0..=10 => ColorPalette::category10().truncated(size),
        11..=20 => ColorPalette::category20().truncated(size),
        _ => ColorPalette::viridis(size),
    }
}

/// Color at `idx` of `palette_of(size)`, computed without building the palette
pub fn palette_color(size: usize, idx: usize) -> Option<String> {
    if idx >= size {
        return None;
    }
    match size {
        0..=10 => CATEGORY10.get(idx).map(|c| c.to_string()),
        11..=20 => CATEGORY20.get(idx).map(|c| c.to_string()),
        _ => {
            let (r, g, b) = sample_viridis(idx as f64 / (size - 1) as f64);
            Some(to_hex(r, g, b))
        }
    }
}

/// Cursor over a palette handing out one color per auto-colored glyph.
///
/// Passed explicitly into the dispatcher so separate plotting sessions never
/// share state.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: ColorPalette,
    cursor: usize,
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::new(ColorPalette::category10())
    }
}

impl ColorCycle {
    pub fn new(palette: ColorPalette) -> Self {
        Self { palette, cursor: 0 }
    }

    /// Return the color under the cursor and advance, wrapping at the end
    pub fn next_color(&mut self) -> String {
        if self.palette.is_empty() {
            return "#000000".to_string();
        }
        let color = self.palette.colors[self.cursor % self.palette.len()].clone();
        self.cursor = (self.cursor + 1) % self.palette.len();
        color
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Parse a named or `#rrggbb` color
pub fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let named = match color.to_ascii_lowercase().as_str() {
        "red" => Some((255, 0, 0)),
        "green" => Some((0, 128, 0)),
        "blue" => Some((0, 0, 255)),
        "black" => Some((0, 0, 0)),
        "white" => Some((255, 255, 255)),
        "yellow" => Some((255, 255, 0)),
        "cyan" => Some((0, 255, 255)),
        "magenta" => Some((255, 0, 255)),
        "orange" => Some((255, 165, 0)),
        "gray" | "grey" => Some((128, 128, 128)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Linear interpolation between viridis stops, `t` clamped to [0, 1]
pub fn sample_viridis(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS_STOPS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS_STOPS.len() - 1);
    let frac = scaled - lo as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS_STOPS[lo], VIRIDIS_STOPS[hi]);
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_of_sizes() {
        assert_eq!(palette_of(0).len(), 0);
        assert_eq!(palette_of(3).colors(), &["#1f77b4", "#ff7f0e", "#2ca02c"]);
        assert_eq!(palette_of(12).len(), 12);
        assert_eq!(palette_of(12).get(1), Some("#aec7e8"));
        assert_eq!(palette_of(100).len(), 100);
    }

    #[test]
    fn test_palette_color_matches_palette_of() {
        for size in [1, 7, 10, 15, 20, 21, 64] {
            let palette = palette_of(size);
            for idx in 0..size {
                assert_eq!(palette_color(size, idx).as_deref(), palette.get(idx));
            }
            assert_eq!(palette_color(size, size), None);
        }
        assert_eq!(palette_color(usize::MAX, usize::MAX - 1).as_deref(), Some("#fde725"));
    }

    #[test]
    fn test_palette_is_deterministic() {
        assert_eq!(palette_of(37), palette_of(37));
    }

    #[test]
    fn test_viridis_endpoints() {
        let p = ColorPalette::viridis(2);
        assert_eq!(p.get(0), Some("#440154"));
        assert_eq!(p.get(1), Some("#fde725"));
    }

    #[test]
    fn test_color_cycle_order_and_reset() {
        let mut cycle = ColorCycle::default();
        assert_eq!(cycle.next_color(), "#1f77b4");
        assert_eq!(cycle.next_color(), "#ff7f0e");
        assert_eq!(cycle.position(), 2);
        cycle.reset();
        assert_eq!(cycle.next_color(), "#1f77b4");
    }

    #[test]
    fn test_color_cycle_wraps() {
        let mut cycle = ColorCycle::new(palette_of(2));
        cycle.next_color();
        cycle.next_color();
        assert_eq!(cycle.next_color(), "#1f77b4");
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_rgb("red"), Some((255, 0, 0)));
        assert_eq!(parse_rgb("#1f77b4"), Some((0x1f, 0x77, 0xb4)));
        assert_eq!(parse_rgb("#12345"), None);
        assert_eq!(parse_rgb("chartreuse-ish"), None);
    }
}
