//! Ink channels and single-channel coverage planes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::EngineError;

/// One of the five DTF inks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Cyan,
    Magenta,
    Yellow,
    Black,
    White,
}

impl Channel {
    /// All channels in output order.
    pub const ALL: [Channel; 5] = [
        Channel::Cyan,
        Channel::Magenta,
        Channel::Yellow,
        Channel::Black,
        Channel::White,
    ];

    /// Lower-case name, also used in exported file names.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Cyan => "cyan",
            Channel::Magenta => "magenta",
            Channel::Yellow => "yellow",
            Channel::Black => "black",
            Channel::White => "white",
        }
    }

    /// Conventional screen angle in degrees.
    ///
    /// The process inks sit 30° apart (yellow, the least visible, takes 0°)
    /// so their rosettes do not beat into moiré.
    pub fn default_angle(self) -> f64 {
        match self {
            Channel::Cyan => 15.0,
            Channel::Magenta => 75.0,
            Channel::Yellow => 0.0,
            Channel::Black => 45.0,
            Channel::White => 30.0,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EngineError::InvalidProfile(format!("unknown channel '{s}'")))
    }
}

/// One value per ink channel.
///
/// ```
/// use halftone_engine::{Channel, ChannelSet};
///
/// let angles = ChannelSet::from_fn(Channel::default_angle);
/// assert_eq!(angles[Channel::Black], 45.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelSet<T> {
    pub cyan: T,
    pub magenta: T,
    pub yellow: T,
    pub black: T,
    pub white: T,
}

impl<T> ChannelSet<T> {
    /// Build a set by evaluating `f` for each channel in output order.
    pub fn from_fn(mut f: impl FnMut(Channel) -> T) -> Self {
        Self {
            cyan: f(Channel::Cyan),
            magenta: f(Channel::Magenta),
            yellow: f(Channel::Yellow),
            black: f(Channel::Black),
            white: f(Channel::White),
        }
    }

    /// Build a set from values in output order (C, M, Y, K, W).
    pub fn from_array([cyan, magenta, yellow, black, white]: [T; 5]) -> Self {
        Self {
            cyan,
            magenta,
            yellow,
            black,
            white,
        }
    }

    /// Values in output order (C, M, Y, K, W).
    pub fn into_array(self) -> [T; 5] {
        [self.cyan, self.magenta, self.yellow, self.black, self.white]
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Cyan => &self.cyan,
            Channel::Magenta => &self.magenta,
            Channel::Yellow => &self.yellow,
            Channel::Black => &self.black,
            Channel::White => &self.white,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Cyan => &mut self.cyan,
            Channel::Magenta => &mut self.magenta,
            Channel::Yellow => &mut self.yellow,
            Channel::Black => &mut self.black,
            Channel::White => &mut self.white,
        }
    }

    /// `(channel, &value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Transform every value, keeping the channel association.
    pub fn map<U>(self, mut f: impl FnMut(Channel, T) -> U) -> ChannelSet<U> {
        let [c, m, y, k, w] = self.into_array();
        ChannelSet {
            cyan: f(Channel::Cyan, c),
            magenta: f(Channel::Magenta, m),
            yellow: f(Channel::Yellow, y),
            black: f(Channel::Black, k),
            white: f(Channel::White, w),
        }
    }
}

impl<T: Send> ChannelSet<T> {
    /// [`ChannelSet::map`] with the five calls spread over the rayon pool.
    pub fn par_map<U: Send>(self, f: impl Fn(Channel, T) -> U + Sync) -> ChannelSet<U> {
        let [c, m, y, k, w] = self.into_array();
        let f = &f;
        let ((cyan, magenta), ((yellow, black), white)) = rayon::join(
            || rayon::join(|| f(Channel::Cyan, c), || f(Channel::Magenta, m)),
            || {
                rayon::join(
                    || rayon::join(|| f(Channel::Yellow, y), || f(Channel::Black, k)),
                    || f(Channel::White, w),
                )
            },
        );
        ChannelSet {
            cyan,
            magenta,
            yellow,
            black,
            white,
        }
    }
}

impl<T, E> ChannelSet<Result<T, E>> {
    /// The first error in output order, or all five values.
    pub fn transpose(self) -> Result<ChannelSet<T>, E> {
        let [c, m, y, k, w] = self.into_array();
        Ok(ChannelSet {
            cyan: c?,
            magenta: m?,
            yellow: y?,
            black: k?,
            white: w?,
        })
    }
}

impl<T> std::ops::Index<Channel> for ChannelSet<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        self.get(channel)
    }
}

impl<T> std::ops::IndexMut<Channel> for ChannelSet<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        self.get_mut(channel)
    }
}

/// A single-ink coverage raster.
///
/// Stores one `f32` per pixel in row-major order. After separation the values
/// are continuous in `0.0..=1.0`; after screening they are restricted to the
/// screen's output levels (`0.0` / `1.0` for binary screens).
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlane {
    channel: Channel,
    width: usize,
    height: usize,
    dpi: Option<f64>,
    data: Vec<f32>,
}

impl ChannelPlane {
    /// A plane with every pixel set to `value` (clamped to `0.0..=1.0`).
    pub fn filled(channel: Channel, width: usize, height: usize, value: f32) -> Self {
        Self::from_raw(
            channel,
            width,
            height,
            None,
            vec![value.clamp(0.0, 1.0); width * height],
        )
    }

    /// Wrap existing coverage values.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidImage`] when a dimension is zero, the buffer
    /// length is not `width * height`, or a value is outside `0.0..=1.0`.
    pub fn from_vec(
        channel: Channel,
        width: usize,
        height: usize,
        data: Vec<f32>,
    ) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidImage(format!(
                "{channel} plane has zero dimension ({width}x{height})"
            )));
        }
        if data.len() != width * height {
            return Err(EngineError::InvalidImage(format!(
                "{channel} plane buffer has {} values, expected {}",
                data.len(),
                width * height
            )));
        }
        if let Some(bad) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(EngineError::InvalidImage(format!(
                "{channel} plane coverage {bad} is outside [0, 1]"
            )));
        }
        Ok(Self::from_raw(channel, width, height, None, data))
    }

    /// Internal constructor for buffers the engine produced itself.
    pub(crate) fn from_raw(
        channel: Channel,
        width: usize,
        height: usize,
        dpi: Option<f64>,
        data: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            width * height,
            "plane length ({}) must match width * height ({}x{})",
            data.len(),
            width,
            height,
        );
        Self {
            channel,
            width,
            height,
            dpi,
            data,
        }
    }

    /// Attach (or clear) the plane's resolution.
    pub fn with_dpi(mut self, dpi: Option<f64>) -> Self {
        self.dpi = dpi;
        self
    }

    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolution in dots per inch, if known.
    #[inline]
    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    /// Coverage values in row-major order.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the plane and return its buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Coverage at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    /// One row of coverage values.
    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Whether every value is exactly 0 or 1.
    pub fn is_binary(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0 || v == 1.0)
    }

    /// Mean coverage over the plane.
    pub fn coverage(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }

    /// 8-bit gray raster where 255 means full ink.
    pub fn to_gray8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    pub(crate) fn same_size(&self, other: &ChannelPlane) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl ChannelSet<ChannelPlane> {
    /// Check that every plane shares the cyan plane's dimensions.
    pub fn check_dimensions(&self) -> Result<(usize, usize), EngineError> {
        let reference = &self.cyan;
        for (channel, plane) in self.iter() {
            if !plane.same_size(reference) {
                return Err(EngineError::DimensionMismatch {
                    channel,
                    expected_width: reference.width,
                    expected_height: reference.height,
                    found_width: plane.width,
                    found_height: plane.height,
                });
            }
        }
        Ok((reference.width, reference.height))
    }
}

impl From<Channel> for usize {
    /// Position in output order (C=0 .. W=4).
    fn from(channel: Channel) -> usize {
        channel as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(channel.name().parse::<Channel>().unwrap(), channel);
            assert_eq!(channel.to_string(), channel.name());
        }
        assert_eq!("WHITE".parse::<Channel>().unwrap(), Channel::White);
        assert!("orange".parse::<Channel>().is_err());
    }

    #[test]
    fn test_default_angles() {
        let angles = ChannelSet::from_fn(Channel::default_angle);
        assert_eq!(angles.into_array(), [15.0, 75.0, 0.0, 45.0, 30.0]);
    }

    #[test]
    fn test_channel_set_map_preserves_channel() {
        let set = ChannelSet::from_fn(|c| c.name().len());
        let doubled = set.map(|_, n| n * 2);
        assert_eq!(doubled[Channel::Magenta], 14);
        assert_eq!(usize::from(Channel::Black), 3);
    }

    #[test]
    fn test_par_map_keeps_channels_apart() {
        let set = ChannelSet::from_fn(|c| usize::from(c));
        let tagged = set.par_map(|channel, i| (channel, i * 10));
        for (channel, &(seen, value)) in tagged.iter() {
            assert_eq!(seen, channel);
            assert_eq!(value, usize::from(channel) * 10);
        }
    }

    #[test]
    fn test_transpose_reports_first_error() {
        let ok: ChannelSet<Result<u8, &str>> = ChannelSet::from_fn(|_| Ok(1));
        assert_eq!(ok.transpose().unwrap().into_array(), [1; 5]);

        let failed = ChannelSet::from_fn(|c| match c {
            Channel::Yellow => Err("yellow"),
            Channel::White => Err("white"),
            _ => Ok(1u8),
        });
        assert_eq!(failed.transpose(), Err("yellow"));
    }

    #[test]
    fn test_from_vec_validation() {
        assert!(ChannelPlane::from_vec(Channel::Cyan, 2, 2, vec![0.0; 4]).is_ok());
        assert!(ChannelPlane::from_vec(Channel::Cyan, 2, 2, vec![0.0; 3]).is_err());
        assert!(ChannelPlane::from_vec(Channel::Cyan, 0, 2, vec![]).is_err());
        assert!(ChannelPlane::from_vec(Channel::Cyan, 1, 1, vec![1.5]).is_err());
        assert!(ChannelPlane::from_vec(Channel::Cyan, 1, 1, vec![f32::NAN]).is_err());
    }

    #[test]
    fn test_plane_accessors() {
        let plane =
            ChannelPlane::from_vec(Channel::Black, 2, 2, vec![0.0, 1.0, 1.0, 0.5]).unwrap();
        assert_eq!(plane.get(1, 0), 1.0);
        assert_eq!(plane.row(1), &[1.0, 0.5]);
        assert!(!plane.is_binary());
        assert!((plane.coverage() - 0.625).abs() < 1e-9);
        assert_eq!(plane.to_gray8(), vec![0, 255, 255, 128]);
    }

    #[test]
    fn test_check_dimensions() {
        let mut planes = ChannelSet::from_fn(|c| ChannelPlane::filled(c, 4, 3, 0.0));
        assert_eq!(planes.check_dimensions(), Ok((4, 3)));

        planes.white = ChannelPlane::filled(Channel::White, 4, 2, 0.0);
        let err = planes.check_dimensions().unwrap_err();
        assert!(matches!(
            err,
            EngineError::DimensionMismatch {
                channel: Channel::White,
                found_height: 2,
                ..
            }
        ));
    }
}
