//! Network prober that inspects devices over HTTP and raw TCP.

use crate::device::{
    domain::{
        CapabilityVector, ContainerRuntime, DeviceAddress, PlatformAgent, ProbeCredentials,
        ServiceInfo, ServiceStatus, SystemInfo,
    },
    ports::{CapabilityProber, ProbeCheck, ProbeError, ProbeReport, ProbeResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

/// Ports, paths, and limits used by [`HttpCapabilityProber`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpProberConfig {
    /// Upper bound for each individual sub-check.
    #[serde(with = "humantime_serde")]
    pub check_timeout: Duration,
    /// Port of the device health endpoint when the address names none.
    pub http_port: u16,
    /// Path of the device health endpoint.
    pub health_path: String,
    /// Port of the container runtime API.
    pub container_runtime_port: u16,
    /// Version path of the container runtime API.
    pub container_runtime_path: String,
    /// Port of the platform agent marker.
    pub agent_port: u16,
    /// Version path of the platform agent marker.
    pub agent_path: String,
    /// Port of the cache server.
    pub cache_port: u16,
    /// Port of the reverse proxy.
    pub proxy_port: u16,
}

impl Default for HttpProberConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(3),
            http_port: 80,
            health_path: "/health".to_owned(),
            container_runtime_port: 2375,
            container_runtime_path: "/version".to_owned(),
            agent_port: 8080,
            agent_path: "/platform-edge/version".to_owned(),
            cache_port: 6379,
            proxy_port: 80,
        }
    }
}

/// How one sub-check settled.
#[derive(Debug)]
enum CheckOutcome<T> {
    /// The device answered positively.
    Found(T),
    /// The device answered, but not with the capability.
    Rejected,
    /// Nothing answered.
    Silent,
    /// The check hit its timeout.
    TimedOut,
}

impl<T> CheckOutcome<T> {
    const fn reached_device(&self) -> bool {
        matches!(self, Self::Found(_) | Self::Rejected)
    }

    const fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Rejected | Self::Silent | Self::TimedOut => None,
        }
    }
}

/// Reachability bookkeeping across settled sub-checks.
#[derive(Debug, Default)]
struct Tally {
    reached: bool,
    settled: usize,
    timed_out: Vec<ProbeCheck>,
}

impl Tally {
    fn record<T>(&mut self, check: ProbeCheck, outcome: &CheckOutcome<T>) {
        self.settled += 1;
        self.reached |= outcome.reached_device();
        if outcome.timed_out() {
            self.timed_out.push(check);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HealthPayload {
    service: Option<String>,
    version: Option<String>,
    timestamp: Option<String>,
    architecture: Option<String>,
    memory: Option<String>,
    storage: Option<String>,
}

impl HealthPayload {
    fn into_system_info(self) -> SystemInfo {
        let mut info = SystemInfo::available();
        if let Some(service) = self.service {
            info = info.with_service(service);
        }
        if let Some(version) = self.version {
            info = info.with_version(version);
        }
        if let Some(reported_at) = self
            .timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        {
            info = info.with_reported_at(reported_at.with_timezone(&Utc));
        }
        if let Some(architecture) = self.architecture {
            info = info.with_architecture(architecture);
        }
        if let Some(memory) = self.memory {
            info = info.with_memory(memory);
        }
        if let Some(storage) = self.storage {
            info = info.with_storage(storage);
        }
        info
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VersionPayload {
    #[serde(alias = "Version")]
    version: Option<String>,
}

/// Capability prober that talks to real devices.
#[derive(Debug, Clone)]
pub struct HttpCapabilityProber {
    client: reqwest::Client,
    config: HttpProberConfig,
}

impl HttpCapabilityProber {
    /// Builds a prober with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] when the HTTP client cannot be constructed.
    pub fn new(config: HttpProberConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.check_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn health_url(&self, address: &DeviceAddress) -> String {
        let port = address.port().unwrap_or(self.config.http_port);
        device_url(address, port, &self.config.health_path)
    }

    fn get(&self, url: String, credentials: Option<&ProbeCredentials>) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match credentials {
            Some(creds) => request.basic_auth(
                creds.username(),
                creds.secret().map(|secret| secret.expose_secret().to_owned()),
            ),
            None => request,
        }
    }

    async fn settle<T>(
        &self,
        check: ProbeCheck,
        address: &DeviceAddress,
        future: impl Future<Output = CheckOutcome<T>>,
    ) -> CheckOutcome<T> {
        let outcome = tokio::time::timeout(self.config.check_timeout, future)
            .await
            .unwrap_or(CheckOutcome::TimedOut);
        debug!(
            ip = %address,
            check = %check,
            reached = outcome.reached_device(),
            timed_out = outcome.timed_out(),
            "probe sub-check settled"
        );
        outcome
    }

    async fn check_system(
        &self,
        address: &DeviceAddress,
        credentials: Option<&ProbeCredentials>,
    ) -> CheckOutcome<SystemInfo> {
        let response = match self.get(self.health_url(address), credentials).send().await {
            Ok(response) => response,
            Err(err) => return outcome_for_error(&err),
        };
        if response.status() != reqwest::StatusCode::OK {
            return CheckOutcome::Rejected;
        }
        let payload = response.json::<HealthPayload>().await.unwrap_or_default();
        CheckOutcome::Found(payload.into_system_info())
    }

    async fn check_version(
        &self,
        url: String,
        credentials: Option<&ProbeCredentials>,
    ) -> CheckOutcome<Option<String>> {
        let response = match self.get(url, credentials).send().await {
            Ok(response) => response,
            Err(err) => return outcome_for_error(&err),
        };
        if !response.status().is_success() {
            return CheckOutcome::Rejected;
        }
        let payload = response.json::<VersionPayload>().await.unwrap_or_default();
        CheckOutcome::Found(payload.version)
    }

    async fn check_proxy(
        &self,
        address: &DeviceAddress,
        credentials: Option<&ProbeCredentials>,
    ) -> CheckOutcome<ServiceStatus> {
        let url = device_url(address, self.config.proxy_port, "/");
        match self.get(url, credentials).send().await {
            Ok(response) if response.status().is_success() => {
                CheckOutcome::Found(ServiceStatus::Running)
            }
            Ok(response) if response.status() == reqwest::StatusCode::UNAUTHORIZED => {
                CheckOutcome::Found(ServiceStatus::AuthRequired)
            }
            Ok(_) => CheckOutcome::Rejected,
            Err(err) => outcome_for_error(&err),
        }
    }

    async fn check_cache(&self, address: &DeviceAddress) -> CheckOutcome<ServiceStatus> {
        let target = format!("{}:{}", address.url_host(), self.config.cache_port);
        let Ok(mut stream) = TcpStream::connect(target).await else {
            return CheckOutcome::Silent;
        };
        if stream.write_all(b"PING\r\n").await.is_err() {
            return CheckOutcome::Rejected;
        }
        let mut reply = String::new();
        if BufReader::new(stream).read_line(&mut reply).await.is_err() {
            return CheckOutcome::Rejected;
        }
        if reply.starts_with("+PONG") {
            CheckOutcome::Found(ServiceStatus::Running)
        } else if reply.starts_with("-NOAUTH") {
            CheckOutcome::Found(ServiceStatus::AuthRequired)
        } else {
            CheckOutcome::Rejected
        }
    }
}

fn device_url(address: &DeviceAddress, port: u16, path: &str) -> String {
    format!("http://{}:{port}{path}", address.url_host())
}

fn outcome_for_error<T>(err: &reqwest::Error) -> CheckOutcome<T> {
    if err.is_timeout() {
        CheckOutcome::TimedOut
    } else {
        CheckOutcome::Silent
    }
}

#[async_trait]
impl CapabilityProber for HttpCapabilityProber {
    async fn probe(
        &self,
        address: &DeviceAddress,
        credentials: Option<&ProbeCredentials>,
    ) -> ProbeResult<ProbeReport> {
        let runtime_url = device_url(
            address,
            self.config.container_runtime_port,
            &self.config.container_runtime_path,
        );
        let agent_url = device_url(address, self.config.agent_port, &self.config.agent_path);

        let (system, runtime, agent, cache, proxy) = tokio::join!(
            self.settle(
                ProbeCheck::System,
                address,
                self.check_system(address, credentials)
            ),
            self.settle(
                ProbeCheck::ContainerRuntime,
                address,
                self.check_version(runtime_url, credentials)
            ),
            self.settle(
                ProbeCheck::PlatformAgent,
                address,
                self.check_version(agent_url, credentials)
            ),
            self.settle(ProbeCheck::Cache, address, self.check_cache(address)),
            self.settle(
                ProbeCheck::ReverseProxy,
                address,
                self.check_proxy(address, credentials)
            ),
        );

        let mut tally = Tally::default();
        tally.record(ProbeCheck::System, &system);
        tally.record(ProbeCheck::ContainerRuntime, &runtime);
        tally.record(ProbeCheck::PlatformAgent, &agent);
        tally.record(ProbeCheck::Cache, &cache);
        tally.record(ProbeCheck::ReverseProxy, &proxy);

        if !tally.reached {
            return Err(if tally.timed_out.len() == tally.settled {
                ProbeError::Timeout(address.clone())
            } else {
                ProbeError::Unreachable(address.clone())
            });
        }

        let mut services = Vec::new();
        if let Some(status) = cache.found() {
            services.push(ServiceInfo::new("redis", status, self.config.cache_port));
        }
        if let Some(status) = proxy.found() {
            services.push(ServiceInfo::new("nginx", status, self.config.proxy_port));
        }
        let platform_agent = match agent.found() {
            Some(version) => {
                services.push(ServiceInfo::new(
                    "platform-edge",
                    ServiceStatus::Running,
                    self.config.agent_port,
                ));
                PlatformAgent::deployed(version)
            }
            None => PlatformAgent::absent(),
        };

        let capabilities = CapabilityVector::new(
            system.found().unwrap_or_else(SystemInfo::unavailable),
            runtime
                .found()
                .map_or_else(ContainerRuntime::absent, ContainerRuntime::installed),
            platform_agent,
            services,
        );
        Ok(ProbeReport::partial(capabilities, tally.timed_out))
    }

    async fn check_liveness(&self, address: &DeviceAddress) -> ProbeResult<()> {
        match self.client.get(self.health_url(address)).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.is_timeout() => Err(ProbeError::Timeout(address.clone())),
            Err(_) => Err(ProbeError::Unreachable(address.clone())),
        }
    }
}
