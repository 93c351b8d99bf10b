use crate::sys::host::{Host, HostError, Signal, SignalHandlerId};

/// A connected signal handler.
///
/// The only way to get rid of a `Subscription` is [`Subscription::release`],
/// which disconnects it from the host.
#[must_use = "dropping a Subscription leaves the handler connected"]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SignalHandlerId,
    signal: Signal,
}

impl Subscription {
    pub fn connect<H: Host + ?Sized>(host: &mut H, signal: Signal) -> Result<Self, HostError> {
        let id = host.connect(signal)?;
        Ok(Subscription { id, signal })
    }

    pub fn id(&self) -> SignalHandlerId { self.id }

    pub fn signal(&self) -> Signal { self.signal }

    pub fn release<H: Host + ?Sized>(self, host: &mut H) { host.disconnect(self.id); }
}
