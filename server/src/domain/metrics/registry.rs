//! Attribute classification
//!
//! The registry decides, for one raw `(attribute, value)` pair, whether the
//! attribute is dropped, unknown, converted into a gauge or rejected as
//! invalid. It is built once at startup and shared read-only afterwards.

use std::collections::{HashMap, HashSet};

use super::mapper::{KWH_TO_JOULES, MapError, ValueMapper};
use super::types::RawValue;

/// Namespace prepended to every exported metric name
pub const NAMESPACE: &str = "smartthings";

/// Label names carried by every device metric
pub const LABEL_NAMES: [&str; 2] = ["id", "name"];

const OFF_ON: ValueMapper = ValueMapper::one_of("off", "on");
const OPEN_CLOSED: ValueMapper = ValueMapper::one_of("open", "closed");
const LOCKED_UNLOCKED: ValueMapper = ValueMapper::one_of("locked", "unlocked");
const INACTIVE_ACTIVE: ValueMapper = ValueMapper::one_of("inactive", "active");
const ABSENT_PRESENT: ValueMapper = ValueMapper::one_of("not present", "present");

/// Attributes that are never exported
const DROPPED_ATTRIBUTES: &[&str] = &[
    "DeviceWatch-DeviceStatus",
    "DeviceWatch-Enroll",
    "numberOfButtons",
    "color",
    "colorName",
    "button",
    "indicatorStatus",
    "supportedButtonValues",
    "bulbTemp",
    "status",
    "threeAxis",
    "acceleration",
    "door",
    // Rachio controllers
    "curZoneIsCycling",
    "curZoneCycleCount",
    "controllerOn",
    "rainDelay",
    "curZoneNumber",
    "curZoneWaterTime",
    "rainDelayStr",
    "hardwareModel",
    "hardwareDesc",
    "activeZoneCnt",
    "curZoneRunStatus",
    "standbyMode",
    "curZoneName",
    "curZoneDuration",
    "curZoneStartDate",
    // Rachio valves
    "zoneSquareFeet",
    "efficiency",
    "indicashadeNametorStatus",
    "zoneName",
    "saturatedDepthOfWater",
    "zoneNumber",
    "watering",
    "zoneTotalDuration",
    "rootZoneDepth",
    "zoneWaterTime",
    "depthOfWater",
    "zoneElapsed",
    "slopeName",
    "cropName",
    "availableWater",
    "nozzleName",
    "maxRuntime",
    "zoneDuration",
    "zoneStartDate",
    "zoneCycleCount",
    "inStandby",
    "lastUpdatedDt",
    "scheduleType",
    "shadeName",
    "valve",
    "soilName",
    // D-Link cameras
    "image",
    "statusMessage",
    "mute",
    "hubactionMode",
    "switch2",
    "switch3",
    "switch4",
    "switch5",
    "switch6",
    "captureTime",
    "camera",
    "settings",
    "stream",
    "clip",
    // Arlo cameras
    "nightVision",
    "powerManagement",
    "desiredCameraState",
    "ruleId",
    "sound",
    "invertImage",
    "offline",
    "rssi",
    "active",
    "timeLastRefresh",
    "lqi",
    "clipStatus",
    // Rooms
    "occupancy",
    "occupancyIconURL",
    "countdown",
    // Multisensors
    "batteryStatus",
    "tamper",
    "powerSource",
];

/// `(attribute, metric name, help, mapper)`
const METRIC_TABLE: &[(&str, &str, &str, ValueMapper)] = &[
    ("alarm", "alarm", "1 if the alarm is on.", OFF_ON),
    ("alarmState", "alarm_cleared", "0 if the alarm is clear.", ValueMapper::Clear),
    ("battery", "battery_percentage", "Percentage of battery remaining.", ValueMapper::Float),
    ("carbonMonoxide", "contact_closed", "1 if the contact is closed.", ValueMapper::Clear),
    ("contact", "contact_closed", "1 if the contact is closed.", OPEN_CLOSED),
    (
        "energy",
        "energy_usage_joules",
        "Energy usage in joules.",
        ValueMapper::ScaledFloat(KWH_TO_JOULES),
    ),
    ("humidity", "humidity_level", "Humidity Level.", ValueMapper::Float),
    ("fanSpeed", "fan_level", "Fan Level.", ValueMapper::Float),
    ("illuminance", "lux_level", "LUX Level.", ValueMapper::Float),
    ("level", "level_percent", "Level.", ValueMapper::Float),
    ("lock", "locked", "Is Locked.", LOCKED_UNLOCKED),
    ("motion", "motion_detected", "1 if presence is detected.", INACTIVE_ACTIVE),
    ("power", "power_usage_watts", "Current power usage in watts.", ValueMapper::Float),
    ("presence", "presence_detected", "1 if presence is detected.", ABSENT_PRESENT),
    ("pressure", "pressure_pascals", "Current pressure in pascals.", ValueMapper::Float),
    ("smoke", "smoke_detected", "1 if smoke is detected.", ValueMapper::Clear),
    ("switch", "switch_enabled", "1 if the switch is on.", OFF_ON),
    ("temperature", "temperature_fahrenheit", "Temperature in fahrenheit.", ValueMapper::Float),
    ("ultravioletIndex", "ultraviolet_index", "Ultraviolet Index.", ValueMapper::Float),
    // Vehicles
    ("speed", "speed_miles_per_hour", "Speed at Miles Per Hour.", ValueMapper::Float),
    ("heading", "heading", "heading.", ValueMapper::Float),
    ("longitude", "longitude", "longitude.", ValueMapper::Float),
    ("latitude", "latitude", "latitude.", ValueMapper::Float),
    ("odometer", "odometer", "odometer.", ValueMapper::Float),
    ("batteryRange", "battery_range", "Range in Miles for Battery.", ValueMapper::Float),
    // Lighting and device health
    ("healthStatus", "healthStatus", "Health Status.", ValueMapper::Float),
    ("hue", "hue", "Lighting Hue.", ValueMapper::Float),
    ("saturation", "saturation", "Lighting Saturation.", ValueMapper::Float),
    ("whiteLevel", "whiteLevel", "White Light Level.", ValueMapper::Float),
    ("checkInterval", "checkInterval", "Check Interval.", ValueMapper::Float),
    ("colorTemperature", "colorTemperature", "Color Temperature.", ValueMapper::Float),
];

/// Definition of one exported metric family
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    /// Metric name without namespace
    pub name: String,
    pub help: String,
    pub mapper: ValueMapper,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, help: impl Into<String>, mapper: ValueMapper) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            mapper,
        }
    }

    /// Fully-qualified name, e.g. `smartthings_battery_percentage`
    pub fn fq_name(&self) -> String {
        format!("{}_{}", NAMESPACE, self.name)
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        &LABEL_NAMES
    }
}

/// Attribute names that are never reported
#[derive(Debug, Clone, Default)]
pub struct DropSet(HashSet<String>);

impl DropSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

impl<S: Into<String>> FromIterator<S> for DropSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Result of classifying one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    Dropped,
    Unknown,
    Converted { metric: &'a MetricSpec, value: f64 },
    Invalid(MapError),
}

/// Name-indexed metric definitions plus the drop set
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, MetricSpec>,
    dropped: DropSet,
}

impl MetricRegistry {
    pub fn new(dropped: DropSet) -> Self {
        Self {
            metrics: HashMap::new(),
            dropped,
        }
    }

    /// Registry with the SmartThings attribute table
    pub fn smartthings() -> Self {
        let dropped = DROPPED_ATTRIBUTES.iter().copied().collect();
        METRIC_TABLE.iter().fold(
            Self::new(dropped),
            |registry, &(attribute, name, help, mapper)| {
                registry.with_metric(attribute, MetricSpec::new(name, help, mapper))
            },
        )
    }

    /// Wire an attribute to a metric. Several attributes may share one metric name.
    pub fn with_metric(mut self, attribute: impl Into<String>, spec: MetricSpec) -> Self {
        self.metrics.insert(attribute.into(), spec);
        self
    }

    pub fn classify(&self, name: &str, raw: &RawValue) -> Outcome<'_> {
        if self.dropped.contains(name) {
            return Outcome::Dropped;
        }

        let Some(metric) = self.metrics.get(name) else {
            return Outcome::Unknown;
        };

        match metric.mapper.map(name, raw) {
            Ok(value) => Outcome::Converted { metric, value },
            Err(e) => Outcome::Invalid(e),
        }
    }

    /// Every metric family this registry can emit, one entry per metric name,
    /// sorted by name. Attributes hidden by the drop set are not listed.
    pub fn describe(&self) -> Vec<&MetricSpec> {
        let mut by_name: HashMap<&str, &MetricSpec> = HashMap::new();
        for (attribute, spec) in &self.metrics {
            if self.dropped.contains(attribute) {
                continue;
            }
            by_name.entry(spec.name.as_str()).or_insert(spec);
        }

        let mut specs: Vec<&MetricSpec> = by_name.into_values().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }
}
