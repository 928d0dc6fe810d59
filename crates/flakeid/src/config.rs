use core::time::Duration;

use crate::{BitLayout, DEFAULT_EPOCH, Field, Fields, ParsedComponents, Result};

/// The static identity of one generator instance.
///
/// Uniqueness across instances relies entirely on no two live instances
/// sharing a topology. This is assigned out of band and never checked at
/// runtime.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Topology {
    /// Region or datacenter ID.
    pub region: u64,
    /// Application ID. Must be `0` when the layout has no app field.
    pub app: u64,
    /// Machine or worker ID.
    pub machine: u64,
}

impl Topology {
    pub const fn new(region: u64, app: u64, machine: u64) -> Self {
        Self {
            region,
            app,
            machine,
        }
    }
}

/// Immutable generator configuration: topology, epoch, and bit layout.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use flakeid::{BitLayout, Config, Topology};
///
/// let config = Config::new(Topology::new(1, 2, 3))
///     .with_epoch(Duration::from_millis(1_700_000_000_000))
///     .with_layout(BitLayout::new(41, 5, 0, 8, 10)?);
/// assert!(config.validate().is_err()); // app 2 does not fit a 0-bit field
/// # Ok::<(), flakeid::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    topology: Topology,
    epoch: Duration,
    layout: BitLayout,
}

impl Config {
    /// Creates a configuration using [`DEFAULT_EPOCH`] and the default
    /// [`BitLayout`].
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            epoch: DEFAULT_EPOCH,
            layout: BitLayout::default(),
        }
    }

    /// Sets the epoch, as a [`Duration`] since 1970-01-01 UTC.
    #[must_use]
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: BitLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub const fn topology(&self) -> Topology {
        self.topology
    }

    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    /// The epoch in whole milliseconds since the UNIX epoch, saturating at
    /// [`u64::MAX`].
    pub fn epoch_millis(&self) -> u64 {
        u64::try_from(self.epoch.as_millis()).unwrap_or(u64::MAX)
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    /// Checks the layout, then that every topology value fits its field.
    ///
    /// Whether the epoch lies in the future is not checked here: that is
    /// relative to the clock reading of each generation call.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidLayout`] if the layout does not sum to 64 bits
    /// - [`crate::Error::FieldOverflow`] for the first topology value that
    ///   does not fit, including any non-zero value for a zero-width field
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.layout.check(Field::Region, self.topology.region)?;
        self.layout.check(Field::App, self.topology.app)?;
        self.layout.check(Field::Machine, self.topology.machine)?;
        Ok(())
    }

    /// Packs `timestamp` (milliseconds since the epoch) and `sequence` with
    /// this configuration's topology.
    pub const fn pack(&self, timestamp: u64, sequence: u64) -> u64 {
        self.layout.pack(&Fields {
            timestamp,
            region: self.topology.region,
            app: self.topology.app,
            machine: self.topology.machine,
            sequence,
        })
    }

    /// Splits an identifier into its components.
    ///
    /// This never fails: any 64-bit value decodes, and out-of-range fields are
    /// reported as found. The absolute timestamp is `epoch + elapsed`.
    pub fn decode(&self, id: u64) -> ParsedComponents {
        let fields = self.layout.unpack(id);
        ParsedComponents {
            timestamp_millis: self.epoch_millis().saturating_add(fields.timestamp),
            elapsed_millis: fields.timestamp,
            region: fields.region,
            app: fields.app,
            machine: fields.machine,
            sequence: fields.sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn default_config_is_valid() {
        let config = Config::new(Topology::new(15, 7, 31));
        assert!(config.validate().is_ok());
        assert_eq!(config.epoch_millis(), 1_577_836_800_000);
    }

    #[test]
    fn rejects_topology_overflow() {
        let config = Config::new(Topology::new(16, 0, 0));
        assert_eq!(
            config.validate(),
            Err(Error::FieldOverflow {
                field: Field::Region,
                value: 16,
                max: 15
            })
        );

        let config = Config::new(Topology::new(0, 8, 0));
        assert!(matches!(
            config.validate(),
            Err(Error::FieldOverflow {
                field: Field::App,
                ..
            })
        ));

        let config = Config::new(Topology::new(0, 0, 32));
        assert!(matches!(
            config.validate(),
            Err(Error::FieldOverflow {
                field: Field::Machine,
                ..
            })
        ));
    }

    #[test]
    fn zero_width_field_only_accepts_zero() {
        let layout = BitLayout::new(42, 5, 0, 7, 10).unwrap();
        let ok = Config::new(Topology::new(3, 0, 100)).with_layout(layout);
        assert!(ok.validate().is_ok());

        let bad = Config::new(Topology::new(3, 1, 100)).with_layout(layout);
        assert_eq!(
            bad.validate(),
            Err(Error::FieldOverflow {
                field: Field::App,
                value: 1,
                max: 0
            })
        );
    }

    #[test]
    fn decode_adds_epoch_to_elapsed() {
        let config = Config::new(Topology::new(1, 2, 3)).with_epoch(Duration::from_millis(1_000));
        let id = config.pack(500, 9);
        let parsed = config.decode(id);
        assert_eq!(parsed.elapsed_millis, 500);
        assert_eq!(parsed.timestamp_millis, 1_500);
        assert_eq!(parsed.region, 1);
        assert_eq!(parsed.app, 2);
        assert_eq!(parsed.machine, 3);
        assert_eq!(parsed.sequence, 9);
    }

    #[test]
    fn decode_never_fails() {
        let config = Config::new(Topology::default())
            .with_epoch(Duration::from_secs(u64::MAX))
            .with_layout(BitLayout::new(64, 0, 0, 0, 0).unwrap());
        let parsed = config.decode(u64::MAX);
        assert_eq!(parsed.elapsed_millis, u64::MAX);
        assert_eq!(parsed.timestamp_millis, u64::MAX);
    }
}
