//! Table definitions

pub(crate) const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS air_quality (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp_ms INTEGER NOT NULL,
        city TEXT NOT NULL,
        aqi INTEGER,
        pm25 REAL,
        pm10 REAL,
        no2 REAL,
        o3 REAL,
        so2 REAL,
        co REAL,
        nh3 REAL,
        station_name TEXT NOT NULL,
        raw_data TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS weather (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp_ms INTEGER NOT NULL,
        city TEXT NOT NULL,
        temperature REAL,
        feels_like REAL,
        temp_min REAL,
        temp_max REAL,
        humidity REAL,
        pressure REAL,
        wind_speed REAL,
        wind_direction REAL,
        clouds REAL,
        visibility REAL,
        weather_main TEXT,
        weather_description TEXT,
        raw_data TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS iot_sensors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp_ms INTEGER NOT NULL,
        sensor_id TEXT NOT NULL,
        location_name TEXT NOT NULL,
        location_lat REAL,
        location_lon REAL,
        pm25 REAL,
        pm10 REAL,
        no2 REAL,
        o3 REAL,
        so2 REAL,
        co REAL,
        temperature REAL,
        humidity REAL,
        status TEXT NOT NULL DEFAULT 'active'
    )"#,
    r#"CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp_ms INTEGER NOT NULL,
        pollutant TEXT NOT NULL,
        type TEXT NOT NULL,
        zone TEXT NOT NULL,
        level TEXT NOT NULL,
        message TEXT NOT NULL,
        value REAL NOT NULL,
        threshold REAL NOT NULL,
        population INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active'
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_air_quality_ts ON air_quality (timestamp_ms)",
    "CREATE INDEX IF NOT EXISTS idx_weather_ts ON weather (timestamp_ms)",
    "CREATE INDEX IF NOT EXISTS idx_iot_sensors_zone ON iot_sensors (location_name, sensor_id)",
    "CREATE INDEX IF NOT EXISTS idx_iot_sensors_ts ON iot_sensors (timestamp_ms)",
    "CREATE INDEX IF NOT EXISTS idx_iot_sensors_source_ts ON iot_sensors (sensor_id, timestamp_ms)",
    "CREATE INDEX IF NOT EXISTS idx_alerts_status_ts ON alerts (status, timestamp_ms)",
];
