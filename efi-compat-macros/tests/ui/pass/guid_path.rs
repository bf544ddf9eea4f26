use efi_compat::proto::unsafe_protocol;
use efi_compat::Identify;
use efi_compat_raw::protocol::rng::RngProtocol;

#[repr(transparent)]
#[unsafe_protocol(RngProtocol::GUID)]
struct Rng(RngProtocol);

fn main() {
    assert_eq!(Rng::GUID, RngProtocol::GUID);
    assert_eq!(size_of::<Rng>(), size_of::<RngProtocol>());
}
