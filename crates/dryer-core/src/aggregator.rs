//! Schedules heater and chamber reads at independent intervals and caches
//! the latest readings, per `spec.md` §4.1.

use crate::error::SensorError;
use crate::limits::{BOX_DATA_INTERVAL_MS, HEATER_TEMP_INTERVAL_MS, MAX_SENSOR_RETRIES};
use crate::observer::Subscribers;
use crate::sensors::{ChamberSensor, HeaterSensor, SensorReading};

/// The heater sensor's conversion state, owned by the aggregator per the
/// "coroutine-style async sensor read" design note in `spec.md` §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaterState {
    Idle,
    Converting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterTempEvent {
    pub value: f32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChamberDataEvent {
    pub temp: f32,
    pub humidity: f32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Heater,
    Chamber,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorErrorEvent {
    pub kind: SensorKind,
    pub timestamp: u64,
}

/// Caches the latest heater-temp, chamber-temp, and chamber-humidity
/// readings, dispatching notifications to registered (external) subscribers
/// on every fresh read or promotion to invalid.
pub struct SensorAggregator<C, H> {
    chamber: C,
    heater: H,

    heater_state: HeaterState,
    last_heater_attempt: u64,
    last_chamber_attempt: u64,
    heater_fail_count: u32,
    chamber_fail_count: u32,

    heater_reading: SensorReading,
    chamber_temp: SensorReading,
    chamber_humidity: SensorReading,

    on_heater_temp: Subscribers<HeaterTempEvent>,
    on_chamber_data: Subscribers<ChamberDataEvent>,
    on_error: Subscribers<SensorErrorEvent>,
}

impl<C: ChamberSensor, H: HeaterSensor> SensorAggregator<C, H> {
    pub fn new(chamber: C, heater: H) -> Self {
        Self {
            chamber,
            heater,
            heater_state: HeaterState::Idle,
            last_heater_attempt: 0,
            last_chamber_attempt: 0,
            heater_fail_count: 0,
            chamber_fail_count: 0,
            heater_reading: SensorReading::invalid(),
            chamber_temp: SensorReading::invalid(),
            chamber_humidity: SensorReading::invalid(),
            on_heater_temp: Subscribers::new(),
            on_chamber_data: Subscribers::new(),
            on_error: Subscribers::new(),
        }
    }

    pub fn begin(&mut self) -> Result<(), SensorError> {
        self.chamber.begin()?;
        self.heater.begin()?;
        self.heater_state = HeaterState::Idle;
        self.heater_fail_count = 0;
        self.chamber_fail_count = 0;
        Ok(())
    }

    pub fn subscribe_heater_temp(&mut self, handler: impl FnMut(&HeaterTempEvent) + 'static) {
        self.on_heater_temp.subscribe(handler);
    }

    pub fn subscribe_chamber_data(&mut self, handler: impl FnMut(&ChamberDataEvent) + 'static) {
        self.on_chamber_data.subscribe(handler);
    }

    pub fn subscribe_error(&mut self, handler: impl FnMut(&SensorErrorEvent) + 'static) {
        self.on_error.subscribe(handler);
    }

    pub fn heater_reading(&self) -> SensorReading {
        self.heater_reading
    }

    pub fn chamber_temp(&self) -> SensorReading {
        self.chamber_temp
    }

    pub fn chamber_humidity(&self) -> SensorReading {
        self.chamber_humidity
    }

    /// Exposes the owned sensor capabilities directly, for test harnesses
    /// that drive a fake sensor's reported value from outside the
    /// aggregator.
    pub fn sensors_mut(&mut self) -> (&mut C, &mut H) {
        (&mut self.chamber, &mut self.heater)
    }

    pub fn tick(&mut self, now: u64) {
        self.tick_heater(now);
        self.tick_chamber(now);
    }

    fn tick_heater(&mut self, now: u64) {
        match self.heater_state {
            HeaterState::Idle => {
                if now.saturating_sub(self.last_heater_attempt) < HEATER_TEMP_INTERVAL_MS {
                    return;
                }
                self.last_heater_attempt = now;
                match self.heater.request_conversion() {
                    Ok(()) => self.heater_state = HeaterState::Converting,
                    Err(_) => self.record_heater_failure(now),
                }
            }
            HeaterState::Converting => {
                if !self.heater.is_conversion_ready() {
                    return;
                }
                match self.heater.retrieve() {
                    Ok(value) => {
                        self.heater_fail_count = 0;
                        self.heater_reading = SensorReading { value, timestamp: now, valid: true };
                        self.on_heater_temp.dispatch(&HeaterTempEvent { value, timestamp: now });
                    }
                    Err(_) => self.record_heater_failure(now),
                }
                self.heater_state = HeaterState::Idle;
            }
        }
    }

    fn record_heater_failure(&mut self, now: u64) {
        self.heater_fail_count += 1;
        if self.heater_fail_count >= MAX_SENSOR_RETRIES && self.heater_reading.valid {
            self.heater_reading.valid = false;
            self.on_error.dispatch(&SensorErrorEvent { kind: SensorKind::Heater, timestamp: now });
        }
    }

    fn tick_chamber(&mut self, now: u64) {
        if now.saturating_sub(self.last_chamber_attempt) < BOX_DATA_INTERVAL_MS {
            return;
        }
        self.last_chamber_attempt = now;
        match self.chamber.read() {
            Ok((temp, humidity)) => {
                self.chamber_fail_count = 0;
                self.chamber_temp = SensorReading { value: temp, timestamp: now, valid: true };
                self.chamber_humidity = SensorReading { value: humidity, timestamp: now, valid: true };
                self.on_chamber_data.dispatch(&ChamberDataEvent { temp, humidity, timestamp: now });
            }
            Err(_) => {
                self.chamber_fail_count += 1;
                if self.chamber_fail_count >= MAX_SENSOR_RETRIES && self.chamber_temp.valid {
                    self.chamber_temp.valid = false;
                    self.chamber_humidity.valid = false;
                    self.on_error.dispatch(&SensorErrorEvent { kind: SensorKind::Chamber, timestamp: now });
                }
            }
        }
    }
}
