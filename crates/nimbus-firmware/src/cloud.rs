//! HTTP client for the cloud "latest readings" endpoint

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use log::{debug, warn};
use nimbus_core::telemetry::decode_latest_readings;
use nimbus_core::{DataService, FetchError, SensorReading};
use reqwless::client::HttpClient;
use reqwless::request::Method;

use crate::clock::CloudClock;

const TCP_SOCKETS: usize = 1;
const TCP_BUFFER_SIZE: usize = 1024;
const HEADER_BUFFER_SIZE: usize = 1024;

/// Room for a full batch of readings at roughly 90 bytes each
pub const BODY_BUFFER_SIZE: usize = 16 * 1024;

pub type CloudTcpState = TcpClientState<TCP_SOCKETS, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>;

/// [`DataService`] backed by a plain HTTP GET
///
/// Each fetch opens a fresh connection. The newest reading's timestamp also
/// anchors the device's wall clock.
pub struct HttpCloud {
    tcp: TcpClient<'static, TCP_SOCKETS, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>,
    dns: DnsSocket<'static>,
    url: &'static str,
    clock: &'static CloudClock,
    headers: Box<[u8]>,
    body: Box<[u8]>,
}

impl HttpCloud {
    pub fn new(
        stack: Stack<'static>,
        tcp_state: &'static CloudTcpState,
        url: &'static str,
        clock: &'static CloudClock,
    ) -> Self {
        Self {
            tcp: TcpClient::new(stack, tcp_state),
            dns: DnsSocket::new(stack),
            url,
            clock,
            headers: vec![0; HEADER_BUFFER_SIZE].into_boxed_slice(),
            body: vec![0; BODY_BUFFER_SIZE].into_boxed_slice(),
        }
    }
}

fn transport(stage: &'static str, error: reqwless::Error) -> FetchError {
    warn!("HTTP {} failed: {:?}", stage, error);
    FetchError::Transport(stage)
}

impl DataService for HttpCloud {
    async fn fetch_readings(&mut self) -> Result<Vec<SensorReading>, FetchError> {
        let max = self.body.len();
        let mut client = HttpClient::new(&self.tcp, &self.dns);

        let mut request = client
            .request(Method::GET, self.url)
            .await
            .map_err(|e| transport("connect", e))?;
        let response = request
            .send(&mut self.headers)
            .await
            .map_err(|e| transport("request", e))?;

        if !response.status.is_successful() {
            return Err(FetchError::Status {
                status: response.status.0,
            });
        }

        let len = response
            .body()
            .reader()
            .read_to_end(&mut self.body)
            .await
            .map_err(|e| match e {
                reqwless::Error::BufferTooSmall => FetchError::ResponseTooLarge { max },
                other => transport("read body", other),
            })?;
        debug!("Received {} byte readings payload", len);

        let readings = decode_latest_readings(&self.body[..len])?;
        if let Some(newest) = readings.last() {
            self.clock.sync(newest.timestamp);
        }
        Ok(readings)
    }
}
