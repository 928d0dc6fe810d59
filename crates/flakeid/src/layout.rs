use core::fmt;

use crate::{Error, Result};

/// Default timestamp width: ~139 years of milliseconds.
pub const DEFAULT_TIMESTAMP_BITS: u8 = 42;
/// Default region width: 16 regions.
pub const DEFAULT_REGION_BITS: u8 = 4;
/// Default app width: 8 apps.
pub const DEFAULT_APP_BITS: u8 = 3;
/// Default machine width: 32 machines per app.
pub const DEFAULT_MACHINE_BITS: u8 = 5;
/// Default sequence width: 1024 IDs per millisecond.
pub const DEFAULT_SEQUENCE_BITS: u8 = 10;

/// The fields of an identifier, most significant first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Timestamp,
    Region,
    App,
    Machine,
    Sequence,
}

impl Field {
    /// All fields in packing order, most significant first.
    pub const ALL: [Self; 5] = [
        Self::Timestamp,
        Self::Region,
        Self::App,
        Self::Machine,
        Self::Sequence,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase field name, as used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Region => "region",
            Self::App => "app",
            Self::Machine => "machine",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw field widths, before validation.
///
/// This is the serialized form of a [`BitLayout`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Widths {
    pub timestamp: u8,
    pub region: u8,
    pub app: u8,
    pub machine: u8,
    pub sequence: u8,
}

impl Widths {
    /// Sum of all five widths, computed without overflow.
    pub const fn total(&self) -> u32 {
        self.timestamp as u32
            + self.region as u32
            + self.app as u32
            + self.machine as u32
            + self.sequence as u32
    }

    const fn get(&self, field: Field) -> u8 {
        match field {
            Field::Timestamp => self.timestamp,
            Field::Region => self.region,
            Field::App => self.app,
            Field::Machine => self.machine,
            Field::Sequence => self.sequence,
        }
    }
}

impl Default for Widths {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP_BITS,
            region: DEFAULT_REGION_BITS,
            app: DEFAULT_APP_BITS,
            machine: DEFAULT_MACHINE_BITS,
            sequence: DEFAULT_SEQUENCE_BITS,
        }
    }
}

/// Every field of an identifier, unpacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fields {
    /// Milliseconds since the configured epoch.
    pub timestamp: u64,
    pub region: u64,
    pub app: u64,
    pub machine: u64,
    pub sequence: u64,
}

/// How the 64 bits of an identifier are split between its fields.
///
/// From most to least significant bit:
///
/// ```text
///  +-----------+--------+-----+---------+----------+
///  | timestamp | region | app | machine | sequence |
///  +-----------+--------+-----+---------+----------+
///  |<--- MSB ------- 64 bits -------- LSB -------->|
/// ```
///
/// The widths always sum to exactly 64. Any field may be zero bits wide, in
/// which case it packs to nothing and unpacks to `0`. Shifts and masks are
/// derived once, when the layout is validated.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, Fields};
///
/// let layout = BitLayout::new(41, 0, 0, 10, 13)?;
/// let raw = layout.pack(&Fields { timestamp: 7, machine: 3, sequence: 1, ..Fields::default() });
/// assert_eq!(layout.unpack(raw).machine, 3);
/// assert!(BitLayout::new(41, 0, 0, 10, 12).is_err());
/// # Ok::<(), flakeid::Error>(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Widths", into = "Widths")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    widths: Widths,
    shifts: [u8; 5],
    masks: [u64; 5],
}

impl BitLayout {
    /// Builds a layout from its five widths, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] unless the widths sum to 64.
    pub fn new(timestamp: u8, region: u8, app: u8, machine: u8, sequence: u8) -> Result<Self> {
        Self::from_widths(Widths {
            timestamp,
            region,
            app,
            machine,
            sequence,
        })
    }

    /// Validates `widths` and derives the per-field shifts and masks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] unless the widths sum to 64.
    pub fn from_widths(widths: Widths) -> Result<Self> {
        validate(&widths)?;

        let mut shifts = [0_u8; 5];
        let mut masks = [0_u64; 5];
        let mut below = 0_u8;
        for field in Field::ALL.into_iter().rev() {
            let width = widths.get(field);
            shifts[field.index()] = below;
            masks[field.index()] = mask(width);
            below += width;
        }

        Ok(Self {
            widths,
            shifts,
            masks,
        })
    }

    /// Checks that the widths sum to exactly 64.
    ///
    /// A constructed [`BitLayout`] is always valid; this is exposed so that
    /// callers holding a deserialized value can re-check it cheaply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] with the actual total otherwise.
    pub fn validate(&self) -> Result<()> {
        validate(&self.widths)
    }

    pub const fn widths(&self) -> Widths {
        self.widths
    }

    /// Width of `field` in bits.
    pub const fn bits(&self, field: Field) -> u8 {
        self.widths.get(field)
    }

    /// Number of bits packed below `field`.
    pub const fn shift(&self, field: Field) -> u8 {
        self.shifts[field.index()]
    }

    /// `(1 << width) - 1` for `field`; `0` for a zero-width field.
    pub const fn mask(&self, field: Field) -> u64 {
        self.masks[field.index()]
    }

    /// Largest value `field` can hold.
    pub const fn max(&self, field: Field) -> u64 {
        self.mask(field)
    }

    pub const fn max_timestamp(&self) -> u64 {
        self.max(Field::Timestamp)
    }

    pub const fn max_region(&self) -> u64 {
        self.max(Field::Region)
    }

    pub const fn max_app(&self) -> u64 {
        self.max(Field::App)
    }

    pub const fn max_machine(&self) -> u64 {
        self.max(Field::Machine)
    }

    pub const fn max_sequence(&self) -> u64 {
        self.max(Field::Sequence)
    }

    /// Checks that `value` fits `field`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOverflow`] when it does not.
    pub fn check(&self, field: Field, value: u64) -> Result<()> {
        let max = self.max(field);
        if value > max {
            return Err(Error::FieldOverflow { field, value, max });
        }
        Ok(())
    }

    /// Masks `value` to the width of `field` and moves it into position.
    pub const fn place(&self, field: Field, value: u64) -> u64 {
        shl(value & self.mask(field), self.shift(field))
    }

    /// Reads `field` out of a packed identifier.
    pub const fn extract(&self, field: Field, raw: u64) -> u64 {
        shr(raw, self.shift(field)) & self.mask(field)
    }

    /// Packs all fields into one identifier. Values are masked to their
    /// widths; callers are expected to have checked them.
    pub const fn pack(&self, fields: &Fields) -> u64 {
        self.place(Field::Timestamp, fields.timestamp)
            | self.place(Field::Region, fields.region)
            | self.place(Field::App, fields.app)
            | self.place(Field::Machine, fields.machine)
            | self.place(Field::Sequence, fields.sequence)
    }

    /// Exact inverse of [`Self::pack`]. Total over all 64-bit inputs.
    pub const fn unpack(&self, raw: u64) -> Fields {
        Fields {
            timestamp: self.extract(Field::Timestamp, raw),
            region: self.extract(Field::Region, raw),
            app: self.extract(Field::App, raw),
            machine: self.extract(Field::Machine, raw),
            sequence: self.extract(Field::Sequence, raw),
        }
    }
}

impl Default for BitLayout {
    /// The 42/4/3/5/10 layout.
    fn default() -> Self {
        let widths = Widths::default();
        Self {
            widths,
            shifts: [22, 18, 15, 10, 0],
            masks: [
                mask(widths.timestamp),
                mask(widths.region),
                mask(widths.app),
                mask(widths.machine),
                mask(widths.sequence),
            ],
        }
    }
}

impl TryFrom<Widths> for BitLayout {
    type Error = Error;

    fn try_from(widths: Widths) -> Result<Self> {
        Self::from_widths(widths)
    }
}

impl From<BitLayout> for Widths {
    fn from(layout: BitLayout) -> Self {
        layout.widths
    }
}

fn validate(widths: &Widths) -> Result<()> {
    let total = widths.total();
    if total != 64 {
        return Err(Error::InvalidLayout { total });
    }
    Ok(())
}

pub(crate) const fn mask(width: u8) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1_u64 << width) - 1
    }
}

// A shift of 64 only happens for a field with no room above it, whose mask is
// zero anyway.
pub(crate) const fn shl(value: u64, shift: u8) -> u64 {
    if shift >= 64 { 0 } else { value << shift }
}

pub(crate) const fn shr(value: u64, shift: u8) -> u64 {
    if shift >= 64 { 0 } else { value >> shift }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_derived_layout() {
        let derived = BitLayout::from_widths(Widths::default()).unwrap();
        assert_eq!(BitLayout::default(), derived);
        assert_eq!(derived.shift(Field::Timestamp), 22);
        assert_eq!(derived.shift(Field::Region), 18);
        assert_eq!(derived.shift(Field::App), 15);
        assert_eq!(derived.shift(Field::Machine), 10);
        assert_eq!(derived.shift(Field::Sequence), 0);
        assert_eq!(derived.max_sequence(), 1023);
        assert_eq!(derived.max_machine(), 31);
        assert_eq!(derived.max_app(), 7);
        assert_eq!(derived.max_region(), 15);
        assert_eq!(derived.max_timestamp(), (1 << 42) - 1);
    }

    #[test]
    fn rejects_layouts_not_summing_to_64() {
        assert_eq!(
            BitLayout::new(41, 4, 3, 5, 10),
            Err(Error::InvalidLayout { total: 63 })
        );
        assert_eq!(
            BitLayout::new(43, 4, 3, 5, 10),
            Err(Error::InvalidLayout { total: 65 })
        );
        // u8 overflow must not wrap back to 64
        assert_eq!(
            BitLayout::new(255, 255, 255, 255, 50),
            Err(Error::InvalidLayout { total: 1070 })
        );
    }

    #[test]
    fn accepts_zero_width_optional_fields() {
        let layout = BitLayout::new(41, 0, 0, 10, 13).unwrap();
        assert_eq!(layout.mask(Field::Region), 0);
        assert_eq!(layout.mask(Field::App), 0);
        assert_eq!(layout.shift(Field::App), 23);
        assert_eq!(layout.shift(Field::Region), 23);
        assert_eq!(layout.shift(Field::Timestamp), 23);

        let fields = Fields {
            timestamp: 12345,
            region: 0,
            app: 0,
            machine: 1023,
            sequence: 8191,
        };
        assert_eq!(layout.unpack(layout.pack(&fields)), fields);
    }

    #[test]
    fn handles_full_width_fields() {
        let layout = BitLayout::new(0, 0, 0, 0, 64).unwrap();
        assert_eq!(layout.max_sequence(), u64::MAX);
        assert_eq!(layout.max_timestamp(), 0);
        assert_eq!(layout.shift(Field::Timestamp), 64);
        assert_eq!(layout.extract(Field::Sequence, u64::MAX), u64::MAX);
        assert_eq!(layout.extract(Field::Timestamp, u64::MAX), 0);

        let layout = BitLayout::new(64, 0, 0, 0, 0).unwrap();
        assert_eq!(layout.max_timestamp(), u64::MAX);
        assert_eq!(layout.max_sequence(), 0);
        assert_eq!(layout.unpack(u64::MAX).timestamp, u64::MAX);
    }

    #[test]
    fn pack_places_fields_most_significant_first() {
        let layout = BitLayout::default();
        let raw = layout.pack(&Fields {
            timestamp: 1,
            region: 2,
            app: 3,
            machine: 4,
            sequence: 5,
        });
        assert_eq!(raw, (1 << 22) | (2 << 18) | (3 << 15) | (4 << 10) | 5);
    }

    #[test]
    fn unpack_is_total() {
        let layout = BitLayout::default();
        let fields = layout.unpack(u64::MAX);
        assert_eq!(fields.timestamp, layout.max_timestamp());
        assert_eq!(fields.region, 15);
        assert_eq!(fields.app, 7);
        assert_eq!(fields.machine, 31);
        assert_eq!(fields.sequence, 1023);
        assert_eq!(layout.pack(&fields), u64::MAX);
    }

    #[test]
    fn check_reports_field_and_limit() {
        let layout = BitLayout::new(42, 0, 3, 9, 10).unwrap();
        assert!(layout.check(Field::Machine, 511).is_ok());
        assert_eq!(
            layout.check(Field::Machine, 512),
            Err(Error::FieldOverflow {
                field: Field::Machine,
                value: 512,
                max: 511
            })
        );
        assert_eq!(
            layout.check(Field::Region, 1),
            Err(Error::FieldOverflow {
                field: Field::Region,
                value: 1,
                max: 0
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_invalid_widths() {
        let json = serde_json::to_string(&BitLayout::default()).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":42,"region":4,"app":3,"machine":5,"sequence":10}"#
        );
        let parsed: BitLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BitLayout::default());

        let bad = r#"{"timestamp":40,"region":4,"app":3,"machine":5,"sequence":10}"#;
        assert!(serde_json::from_str::<BitLayout>(bad).is_err());
    }
}
