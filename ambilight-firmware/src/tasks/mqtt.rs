// MQTT Task - Session zum Broker (ConnectionLifecycle)
use core::cell::RefCell;

use defmt::{Debug2Format, debug, error, info, warn};
use embassy_futures::select::{Either3, select3};
use embassy_net::tcp::{Error as TcpError, TcpSocket};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType};
use embassy_time::{Duration, Ticker, Timer, with_timeout};
use embedded_io_async::{ErrorType, Read, Write};

use rust_mqtt::client::raw_client::{Event, RawMqttClient};
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use ambilight_core::protocol::{format_on, format_rgb};

use crate::config::*;
use crate::{Inbound, InboundSender, Outbound, OutboundReceiver};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Dieser Task ist die einzige Verbindung zum Broker:
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit MQTT Broker und abonniert die Eingangs-Topics
/// - Dekodiert eingehende Payloads und reicht sie an den Strip Task weiter
/// - Published Status-Nachrichten vom Strip Task
/// - Automatisches Reconnect bei Fehlern
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `inbound`: Channel Sender für Kommandos an den Strip Task
/// - `outbound`: Channel Receiver für Status-Nachrichten vom Strip Task
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    inbound: InboundSender,
    outbound: OutboundReceiver,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_session(stack, inbound, outbound).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
///
/// Prüft kontinuierlich Link-Status und DHCP-Konfiguration.
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

// ============================================================================
// Geteilter Socket
// ============================================================================

/// TCP-Socket, den MQTT-Client und Event-Loop gemeinsam nutzen
///
/// Der Client liest und schreibt über diesen Treiber, die Event-Loop
/// fragt zwischen zwei Client-Aufrufen nur `can_recv()` ab. Beide
/// greifen nie gleichzeitig zu.
struct SharedSocket<'s, 'b> {
    socket: &'s RefCell<TcpSocket<'b>>,
}

impl ErrorType for SharedSocket<'_, '_> {
    type Error = TcpError;
}

#[allow(clippy::await_holding_refcell_ref)]
impl Read for SharedSocket<'_, '_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().read(buf).await
    }
}

#[allow(clippy::await_holding_refcell_ref)]
impl Write for SharedSocket<'_, '_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket.borrow_mut().flush().await
    }
}

/// Wartet bis Daten anliegen (oder die Gegenseite geschlossen hat)
///
/// Erst danach wird `poll()` aufgerufen. Ein begonnenes Paket wird so
/// immer vollständig gelesen und nie durch `select` abgebrochen.
async fn wait_readable(socket: &RefCell<TcpSocket<'_>>) {
    loop {
        {
            let socket = socket.borrow();
            if socket.can_recv() || !socket.may_recv() {
                return;
            }
        }
        Timer::after(Duration::from_millis(MQTT_READ_POLL_MS)).await;
    }
}

// ============================================================================
// Session
// ============================================================================

/// Was nach einem vollständig gelesenen Paket zu tun ist
///
/// Hält keine Referenzen auf den Client-Buffer, damit der Client danach
/// wieder verwendet werden kann.
enum Action {
    Forward(Inbound),
    PingAnswered,
    Nothing,
}

type Client<'s, 'b, 'c> = RawMqttClient<'c, SharedSocket<'s, 'b>, 5, CountingRng>;

/// Eine MQTT-Session: Verbinden, Abonnieren, dann Event-Loop
///
/// Ablauf:
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen
/// 3. MQTT CONNECT senden und auf CONNACK warten
/// 4. Eingangs-Topics abonnieren (SUBACKs kommen in der Event-Loop)
/// 5. Strip Task informieren (aktuellen Zustand publishen)
/// 6. Event-Loop: Pakete empfangen / Status publishen / Keep-Alive
///
/// Alle eingehenden Pakete (PUBLISH, PINGRESP, SUBACK) laufen über
/// denselben `poll()`-Pfad. Gesendet wird nur zwischen zwei Paketen.
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet automatisch einen Reconnect-Versuch.
async fn mqtt_session(
    stack: &'static Stack<'static>,
    inbound: InboundSender,
    outbound: OutboundReceiver,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(TCP_TIMEOUT_SECS)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    let socket = RefCell::new(socket);

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    let mut client: Client<'_, '_, '_> = RawMqttClient::new(
        SharedSocket { socket: &socket },
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    // Hier ist ein Abbruch per Timeout unkritisch: die Session endet ohnehin
    match with_timeout(
        Duration::from_secs(MQTT_CONNACK_TIMEOUT_SECS),
        client.poll::<1>(),
    )
    .await
    {
        Ok(Ok(Event::Connack)) => info!("MQTT: Connected to broker"),
        Ok(Ok(Event::Disconnect(reason))) => {
            warn!("MQTT: Broker refused connection: {}", Debug2Format(&reason));
            return Err(MqttError::ProtocolError);
        }
        Ok(_) => return Err(MqttError::ProtocolError),
        Err(_) => return Err(MqttError::Timeout),
    }

    // Subscriptions nach jedem Connect erneuern
    for topic in TOPICS.subscriptions() {
        client
            .subscribe_to_topic(topic)
            .await
            .map_err(|_| MqttError::SubscribeFailed)?;
        info!("MQTT: Subscribing to '{}'", topic);
    }

    // Veraltete Status-Nachrichten aus der Offline-Zeit verwerfen,
    // der Strip Task published gleich den aktuellen Zustand
    while outbound.try_receive().is_ok() {}
    inbound.send(Inbound::Connected).await;

    let mut ping_ticker = Ticker::every(Duration::from_secs(MQTT_PING_INTERVAL_SECS));
    let mut ping_pending = false;

    // Event-Loop
    loop {
        match select3(
            wait_readable(&socket),
            outbound.receive(),
            ping_ticker.next(),
        )
        .await
        {
            Either3::First(()) => {
                let action = receive_packet(&mut client).await?;
                match action {
                    Action::Forward(message) => inbound.send(message).await,
                    Action::PingAnswered => ping_pending = false,
                    Action::Nothing => {}
                }
            }
            Either3::Second(message) => publish(&mut client, message).await?,
            Either3::Third(()) => {
                if ping_pending {
                    return Err(MqttError::Timeout);
                }
                client
                    .send_ping()
                    .await
                    .map_err(|_| MqttError::PingFailed)?;
                ping_pending = true;
            }
        }
    }
}

/// Liest genau ein Paket und übersetzt es in eine `Action`
async fn receive_packet(client: &mut Client<'_, '_, '_>) -> Result<Action, MqttError> {
    let event = client
        .poll::<1>()
        .await
        .map_err(|_| MqttError::ReceiveFailed)?;

    let action = match event {
        Event::Message(topic, payload) => match TOPICS.decode(topic, payload) {
            Ok(Some(event)) => Action::Forward(Inbound::Command(event)),
            Ok(None) => {
                debug!("MQTT: Ignoring message on '{}'", topic);
                Action::Nothing
            }
            Err(e) => {
                // Fehlerhafter Payload: nur dieses Event verwerfen
                warn!("MQTT: Malformed payload on '{}': {}", topic, e);
                Action::Nothing
            }
        },
        Event::Pingresp => Action::PingAnswered,
        Event::Suback(packet_id) => {
            debug!("MQTT: Subscription {} acknowledged", packet_id);
            Action::Nothing
        }
        Event::Disconnect(reason) => {
            warn!("MQTT: Broker disconnected: {}", Debug2Format(&reason));
            return Err(MqttError::ReceiveFailed);
        }
        _ => Action::Nothing,
    };

    Ok(action)
}

/// Published eine Status-Nachricht (QoS 0, nicht retained)
async fn publish(client: &mut Client<'_, '_, '_>, message: Outbound) -> Result<(), MqttError> {
    let (topic, payload) = match message {
        Outbound::On(on) => (TOPICS.get_on, Payload::On(format_on(on))),
        Outbound::Rgb(color) => (TOPICS.get_rgb, Payload::Rgb(format_rgb(color.into()))),
    };
    debug!("MQTT: Sending '{}' -> {}", topic, payload.as_str());

    client
        .send_message(topic, payload.as_str().as_bytes(), QualityOfService::QoS0, false)
        .await
        .map_err(|_| MqttError::PublishFailed)?;
    Ok(())
}

/// Ausgehender Payload als Text
enum Payload {
    On(&'static str),
    Rgb(heapless::String<{ ambilight_core::protocol::RGB_PAYLOAD_LEN }>),
}

impl Payload {
    fn as_str(&self) -> &str {
        match self {
            Payload::On(text) => text,
            Payload::Rgb(text) => text.as_str(),
        }
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(MqttError::DnsResolutionFailed),
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
///
/// Alle möglichen Fehler die während einer MQTT-Session auftreten können.
#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PublishFailed,
    PingFailed,
    Timeout,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
            MqttError::PingFailed => defmt::write!(fmt, "Ping failed"),
            MqttError::Timeout => defmt::write!(fmt, "Broker not responding"),
        }
    }
}
