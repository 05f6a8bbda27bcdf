//! Planar mono/stereo block buffer.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Most channels the signal path carries.
pub const MAX_CHANNELS: usize = 2;

/// Planar block buffer holding one or two channels.
///
/// Storage is allocated by [`new`](Self::new) or [`resize`](Self::resize) and
/// then reused; [`set_len`](Self::set_len) only moves the active length inside
/// the allocated capacity.
#[derive(Debug, Clone, Default)]
pub struct ChannelBuffer {
    channels: [Vec<f32>; MAX_CHANNELS],
    num_channels: usize,
    len: usize,
}

impl ChannelBuffer {
    /// Create a zeroed buffer with `num_channels` active channels and room for
    /// `capacity` samples per channel.
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        let mut buffer = Self::default();
        buffer.resize(capacity);
        buffer.set_num_channels(num_channels);
        buffer
    }

    /// Reallocate every channel to `capacity` samples, zeroed.
    ///
    /// Not real-time safe; call from `prepare`.
    pub fn resize(&mut self, capacity: usize) {
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(capacity, 0.0);
        }
        self.len = self.len.min(capacity);
    }

    /// Samples per channel the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.channels[0].len()
    }

    /// Set the active channel count, clamped to `1..=MAX_CHANNELS`.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.num_channels = num_channels.clamp(1, MAX_CHANNELS);
    }

    /// Active channel count.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Set the active length, clamped to capacity. Returns the length applied.
    pub fn set_len(&mut self, len: usize) -> usize {
        self.len = len.min(self.capacity());
        self.len
    }

    /// Active samples per channel.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no samples are active.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active samples of channel `ch`.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.channels[ch][..self.len]
    }

    /// Mutable active samples of channel `ch`.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.channels[ch][..self.len]
    }

    /// Both channels mutably, if the buffer is stereo.
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        if self.num_channels < 2 {
            return None;
        }
        let len = self.len;
        let (left, right) = self.channels.split_at_mut(1);
        Some((&mut left[0][..len], &mut right[0][..len]))
    }

    /// Zero the active region of every active channel.
    pub fn clear(&mut self) {
        for ch in 0..self.num_channels {
            self.channel_mut(ch).fill(0.0);
        }
    }

    /// Copy channel layout and active samples from `other`.
    ///
    /// Copies at most this buffer's capacity.
    pub fn copy_from(&mut self, other: &ChannelBuffer) {
        self.set_num_channels(other.num_channels);
        let n = self.set_len(other.len);
        for ch in 0..self.num_channels {
            self.channels[ch][..n].copy_from_slice(&other.channels[ch][..n]);
        }
    }

    /// Load `len` samples starting at `offset` from host channel slices.
    ///
    /// Channels beyond [`MAX_CHANNELS`] are ignored. Returns the number of
    /// samples loaded, which is clamped to capacity and to the shortest host
    /// channel.
    pub fn load_from(&mut self, host: &[&mut [f32]], offset: usize, len: usize) -> usize {
        let channels = host.len().min(MAX_CHANNELS);
        if channels == 0 {
            self.len = 0;
            return 0;
        }
        let available = host[..channels]
            .iter()
            .map(|ch| ch.len().saturating_sub(offset))
            .min()
            .unwrap_or(0);
        self.set_num_channels(channels);
        let n = self.set_len(len.min(available));
        for (dst, src) in self.channels.iter_mut().zip(host.iter()) {
            dst[..n].copy_from_slice(&src[offset..offset + n]);
        }
        n
    }

    /// Store the active samples into host channel slices starting at `offset`.
    pub fn store_into(&self, host: &mut [&mut [f32]], offset: usize) {
        for (src, dst) in self.channels[..self.num_channels]
            .iter()
            .zip(host.iter_mut())
        {
            let n = self.len.min(dst.len().saturating_sub(offset));
            dst[offset..offset + n].copy_from_slice(&src[..n]);
        }
    }
}
