use crate::zone::InstrumentZone;

/// An instrument: a named list of sample zones.
#[derive(Debug, Clone, Default)]
pub struct Instrument {
    pub name: String,
    pub zones: Vec<InstrumentZone>,
}

impl Instrument {
    pub fn new(name: impl Into<String>, zones: Vec<InstrumentZone>) -> Self {
        Self {
            name: name.into(),
            zones,
        }
    }
}
