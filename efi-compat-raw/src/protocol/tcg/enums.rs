// SPDX-License-Identifier: MIT OR Apache-2.0

newtype_enum! {
    /// Algorithm identifiers from the [TCG Algorithm Registry].
    ///
    /// Only the hash algorithms and a few common companions are named.
    ///
    /// [TCG Algorithm Registry]: https://trustedcomputinggroup.org/resource/tcg-algorithm-registry/
    pub enum AlgorithmId: u16 => {
        ERROR = 0x0000,
        RSA = 0x0001,
        SHA1 = 0x0004,
        HMAC = 0x0005,
        AES = 0x0006,
        SHA256 = 0x000b,
        SHA384 = 0x000c,
        SHA512 = 0x000d,
        NULL = 0x0010,
        SM3_256 = 0x0012,
    }
}

impl AlgorithmId {
    /// Size in bytes of a digest produced by this algorithm, or `None` if
    /// this is not a hash algorithm known to this crate.
    #[must_use]
    pub const fn digest_size(self) -> Option<usize> {
        match self {
            Self::SHA1 => Some(20),
            Self::SHA256 | Self::SM3_256 => Some(32),
            Self::SHA384 => Some(48),
            Self::SHA512 => Some(64),
            _ => None,
        }
    }
}

newtype_enum! {
    /// Event types stored in the TPM event log.
    ///
    /// The event type selects how the event data is interpreted. See the
    /// Events table of the [TCG PC Client Platform Firmware Profile][spec].
    ///
    /// [spec]: https://trustedcomputinggroup.org/resource/pc-client-specific-platform-firmware-profile-specification/
    pub enum EventType: u32 => {
        PREBOOT_CERT = 0x0000_0000,
        POST_CODE = 0x0000_0001,
        NO_ACTION = 0x0000_0003,
        SEPARATOR = 0x0000_0004,
        ACTION = 0x0000_0005,
        EVENT_TAG = 0x0000_0006,
        CRTM_CONTENTS = 0x0000_0007,
        CRTM_VERSION = 0x0000_0008,
        CPU_MICROCODE = 0x0000_0009,
        PLATFORM_CONFIG_FLAGS = 0x0000_000a,
        TABLE_OF_DEVICES = 0x0000_000b,
        COMPACT_HASH = 0x0000_000c,
        /// Measurement of the boot loader's next stage (`EV_IPL`).
        IPL = 0x0000_000d,
        IPL_PARTITION_DATA = 0x0000_000e,
        NONHOST_CODE = 0x0000_000f,
        NONHOST_CONFIG = 0x0000_0010,
        NONHOST_INFO = 0x0000_0011,
        OMIT_BOOT_DEVICE_EVENTS = 0x0000_0012,
        EFI_EVENT_BASE = 0x8000_0000,
        EFI_VARIABLE_DRIVER_CONFIG = 0x8000_0001,
        EFI_VARIABLE_BOOT = 0x8000_0002,
        EFI_BOOT_SERVICES_APPLICATION = 0x8000_0003,
        EFI_BOOT_SERVICES_DRIVER = 0x8000_0004,
        EFI_RUNTIME_SERVICES_DRIVER = 0x8000_0005,
        EFI_GPT_EVENT = 0x8000_0006,
        EFI_ACTION = 0x8000_0007,
        EFI_PLATFORM_FIRMWARE_BLOB = 0x8000_0008,
        EFI_HANDOFF_TABLES = 0x8000_0009,
        EFI_HCRTM_EVENT = 0x8000_0010,
        EFI_VARIABLE_AUTHORITY = 0x8000_00e0,
    }
}
