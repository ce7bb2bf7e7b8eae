// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

use ambilight_core::{Capabilities, Topics};

// ============================================================================
// LED-Leisten Konfiguration
// ============================================================================

/// GPIO-Pin für die Datenleitung der LED-Leiste (WS2812/Neopixel)
pub const LED_GPIO_PIN: u8 = 18;

/// Anzahl der LEDs im Strip (TV-Ambilight)
pub const LED_COUNT: usize = 185;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// Arbiter Konfiguration
// ============================================================================

/// Fähigkeiten der Bridge
/// `false` = alte reine RGB-Variante (Startup published sofort den Zustand)
pub const CAPABILITIES: Capabilities = Capabilities {
    supports_color_temperature: true,
};

/// Kapazität des Eingangs-Channels (MQTT → Arbiter)
pub const INBOUND_QUEUE_SIZE: usize = 4;

/// Kapazität des Ausgangs-Channels (Arbiter → MQTT)
/// Pro Event höchstens zwei Nachrichten (GetOn + GetRGB)
pub const OUTBOUND_QUEUE_SIZE: usize = 8;

// ============================================================================
// Flash Konfiguration
// ============================================================================

/// Offset des State-Bereichs im Flash (zwei 4 KB Sektoren, A/B-Slots)
/// Muss zu einer freien Partition in partitions.csv passen
pub const STATE_FLASH_OFFSET: u32 = 0x3F_0000;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach WiFi-Fehlern in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable MQTT_BROKER geladen
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
/// Wird zur Build-Zeit aus der Environment Variable MQTT_CLIENT_ID geladen
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Topic-Namen, überschreibbar per .env (MQTT_TOPIC_SET_ON, ...)
pub const TOPICS: Topics<'static> = Topics {
    set_on: topic_or(
        option_env!("MQTT_TOPIC_SET_ON"),
        "rpi-0-w/tv-ambilight/setOn",
    ),
    set_rgb: topic_or(
        option_env!("MQTT_TOPIC_SET_RGB"),
        "rpi-0-w/tv-ambilight/setRGB",
    ),
    set_color_temperature: topic_or(
        option_env!("MQTT_TOPIC_SET_COLOR_TEMPERATURE"),
        "rpi-0-w/tv-ambilight/setColorTemperature",
    ),
    startup: topic_or(
        option_env!("MQTT_TOPIC_STARTUP"),
        "rpi-0-w/tv-ambilight/startup",
    ),
    get_on: topic_or(
        option_env!("MQTT_TOPIC_GET_ON"),
        "rpi-0-w/tv-ambilight/getOn",
    ),
    get_rgb: topic_or(
        option_env!("MQTT_TOPIC_GET_RGB"),
        "rpi-0-w/tv-ambilight/getRGB",
    ),
};

const fn topic_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(topic) => topic,
        None => default,
    }
}

/// MQTT Reconnect Delay in Sekunden
/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Keep-Alive in Sekunden (wird an den Broker gemeldet)
pub const MQTT_KEEP_ALIVE_SECS: u16 = 30;

/// Intervall für PINGREQ, muss unter MQTT_KEEP_ALIVE_SECS liegen
pub const MQTT_PING_INTERVAL_SECS: u64 = 20;

/// Abfrage-Intervall des Sockets auf eingehende Daten (Millisekunden)
/// Erst wenn Daten anliegen wird ein MQTT-Paket gelesen
pub const MQTT_READ_POLL_MS: u64 = 20;

/// Wartezeit auf CONNACK in Sekunden
pub const MQTT_CONNACK_TIMEOUT_SECS: u64 = 10;

/// MQTT Buffer-Größe in Bytes
/// Muss groß genug für MQTT-Pakete sein
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

/// TCP Socket Buffer-Größe (RX und TX) in Bytes
pub const TCP_BUFFER_SIZE: usize = 4096;

/// TCP Timeout in Sekunden
pub const TCP_TIMEOUT_SECS: u64 = 60;
