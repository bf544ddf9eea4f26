use efi_compat::proto::unsafe_protocol;
use efi_compat::{guid, Identify};

#[unsafe_protocol("12345678-9abc-def0-1234-56789abcdef0")]
struct ExampleProtocol {
    revision: u64,
}

fn main() {
    assert_eq!(
        ExampleProtocol::GUID,
        guid!("12345678-9abc-def0-1234-56789abcdef0")
    );
    assert_eq!(
        ExampleProtocol::GUID.to_bytes(),
        [
            0x78, 0x56, 0x34, 0x12, 0xbc, 0x9a, 0xf0, 0xde, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc,
            0xde, 0xf0
        ]
    );
    // The marker field is zero sized.
    assert_eq!(size_of::<ExampleProtocol>(), size_of::<u64>());
}
