use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bridge::{
    BridgeError, CommandBridge, EventBridge, EventChannel, EventStream, SubscriptionGuard,
};

/// Tuning for the loopback engine.
#[derive(Debug, Clone)]
pub struct LoopbackConfig {
    /// Sample rate of the synthesized capture.
    pub sample_rate: u32,
    /// Interval between audio-level emissions.
    pub level_interval: Duration,
    /// Synth tone frequency in Hz.
    pub tone_hz: f32,
    /// Synth tone amplitude in [0, 1].
    pub amplitude: f32,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            level_interval: Duration::from_millis(100),
            tone_hz: 440.0,
            amplitude: 0.4,
        }
    }
}

/// In-process stand-in for the native capture engine.
///
/// While "capturing" it synthesizes a sine tone, accumulates the samples,
/// and publishes an `audio-level` RMS value per buffer; `stop_recording`
/// returns the accumulated capture WAV-encoded. The event side is a small
/// hub with per-channel subscriber lists, so it honors the same contract as
/// the real engine: in-order delivery, independent subscribers, detach on
/// cancel.
#[derive(Clone)]
pub struct LoopbackEngine {
    inner: Arc<Inner>,
}

struct Inner {
    config: LoopbackConfig,
    hub: Mutex<HashMap<EventChannel, Vec<Subscriber>>>,
    next_sub_id: AtomicU64,
    recording: AtomicBool,
    samples: Mutex<Vec<i16>>,
    synth_task: Mutex<Option<JoinHandle<()>>>,
    fail_next_start: Mutex<Option<BridgeError>>,
    fail_next_stop: Mutex<Option<BridgeError>>,
}

struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl LoopbackEngine {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                hub: Mutex::new(HashMap::new()),
                next_sub_id: AtomicU64::new(0),
                recording: AtomicBool::new(false),
                samples: Mutex::new(Vec::new()),
                synth_task: Mutex::new(None),
                fail_next_start: Mutex::new(None),
                fail_next_stop: Mutex::new(None),
            }),
        }
    }

    /// Publish a raw payload on a channel. Tests use this directly to
    /// inject malformed frames.
    pub fn emit(&self, channel: EventChannel, payload: Vec<u8>) {
        self.inner.emit(channel, payload);
    }

    /// What the OS global-shortcut handler does: publish a payload-free
    /// toggle signal.
    pub fn press_hotkey(&self) {
        debug!("hotkey pressed");
        self.inner.emit(EventChannel::ToggleRecording, Vec::new());
    }

    /// Make the next `start_recording` call fail with `err`.
    pub fn fail_next_start(&self, err: BridgeError) {
        *self.inner.fail_next_start.lock().unwrap() = Some(err);
    }

    /// Make the next `stop_recording` call fail with `err`.
    pub fn fail_next_stop(&self, err: BridgeError) {
        *self.inner.fail_next_stop.lock().unwrap() = Some(err);
    }

    /// Number of live subscribers on a channel.
    pub fn subscriber_count(&self, channel: EventChannel) -> usize {
        self.inner
            .hub
            .lock()
            .unwrap()
            .get(&channel)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }
}

impl Default for LoopbackEngine {
    fn default() -> Self {
        Self::new(LoopbackConfig::default())
    }
}

impl Inner {
    fn emit(&self, channel: EventChannel, payload: Vec<u8>) {
        let mut hub = self.hub.lock().unwrap();
        if let Some(subs) = hub.get_mut(&channel) {
            // prune subscribers whose receiving side is gone
            subs.retain(|sub| sub.tx.send(payload.clone()).is_ok());
        }
    }

    fn detach(&self, channel: EventChannel, id: u64) {
        let mut hub = self.hub.lock().unwrap();
        if let Some(subs) = hub.get_mut(&channel) {
            subs.retain(|sub| sub.id != id);
        }
        debug!("subscriber {} detached from {}", id, channel);
    }
}

#[async_trait::async_trait]
impl CommandBridge for LoopbackEngine {
    async fn start_recording(&self) -> Result<(), BridgeError> {
        if let Some(err) = self.inner.fail_next_start.lock().unwrap().take() {
            return Err(err);
        }
        if self.inner.recording.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::BackendUnavailable(
                "already recording".to_string(),
            ));
        }

        self.inner.samples.lock().unwrap().clear();

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let chunk_len = (inner.config.sample_rate as u128
                * inner.config.level_interval.as_millis()
                / 1000) as usize;
            let step = inner.config.tone_hz / inner.config.sample_rate as f32;

            let mut interval = tokio::time::interval(inner.config.level_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut phase = 0.0f32;

            loop {
                interval.tick().await;
                if !inner.recording.load(Ordering::SeqCst) {
                    break;
                }

                let mut chunk = Vec::with_capacity(chunk_len);
                for _ in 0..chunk_len {
                    chunk.push((phase * std::f32::consts::TAU).sin() * inner.config.amplitude);
                    phase = (phase + step).fract();
                }

                let level = rms(&chunk);
                {
                    let mut samples = inner.samples.lock().unwrap();
                    samples.extend(chunk.iter().map(|s| (s * i16::MAX as f32) as i16));
                }

                match serde_json::to_vec(&level) {
                    Ok(payload) => inner.emit(EventChannel::AudioLevel, payload),
                    Err(e) => warn!("failed to encode audio level: {}", e),
                }
            }

            debug!("synth capture task stopped");
        });

        *self.inner.synth_task.lock().unwrap() = Some(task);
        info!("loopback capture started");
        Ok(())
    }

    async fn stop_recording(&self) -> Result<Vec<u8>, BridgeError> {
        let injected = self.inner.fail_next_stop.lock().unwrap().take();

        if !self.inner.recording.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::BackendUnavailable(
                "not recording".to_string(),
            ));
        }

        let task = self.inner.synth_task.lock().unwrap().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("synth capture task panicked: {}", e);
            }
        }

        if let Some(err) = injected {
            return Err(err);
        }

        let samples = self.inner.samples.lock().unwrap().clone();
        let wav = encode_wav(&samples, self.inner.config.sample_rate)?;
        info!(
            "loopback capture stopped: {} samples, {} bytes WAV",
            samples.len(),
            wav.len()
        );
        Ok(wav)
    }

    async fn is_recording(&self) -> Result<bool, BridgeError> {
        Ok(self.inner.recording.load(Ordering::SeqCst))
    }
}

#[async_trait::async_trait]
impl EventBridge for LoopbackEngine {
    async fn subscribe(&self, channel: EventChannel) -> Result<EventStream, BridgeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_sub_id.fetch_add(1, Ordering::SeqCst);

        self.inner
            .hub
            .lock()
            .unwrap()
            .entry(channel)
            .or_default()
            .push(Subscriber { id, tx });

        debug!("subscriber {} attached to {}", id, channel);

        let inner = Arc::clone(&self.inner);
        let guard = SubscriptionGuard::new(move || inner.detach(channel, id));
        Ok(EventStream::new(channel, rx, guard))
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt().min(1.0)
}

fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, BridgeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| BridgeError::BackendUnavailable(format!("wav encode: {}", e)))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| BridgeError::BackendUnavailable(format!("wav encode: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| BridgeError::BackendUnavailable(format!("wav encode: {}", e)))?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_is_capped_at_one() {
        assert_eq!(rms(&[2.0, -2.0]), 1.0);
    }

    #[test]
    fn encoded_wav_round_trips() {
        let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];
        let wav = encode_wav(&samples, 16000).unwrap();

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.into_samples().map(Result::unwrap).collect();
        assert_eq!(decoded, samples);
    }
}
