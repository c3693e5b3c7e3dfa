use dagfs_types::ObjectId;

/// A single in-flight hash computation.
///
/// A `Digest` is consumed by [`finalize`] — it cannot be reused for a second
/// object. That replaces the reset-before-use discipline a shared mutable
/// hasher would need: state from one computation can never leak into the
/// next because each computation gets its own instance.
///
/// [`finalize`]: Digest::finalize
pub trait Digest {
    /// Feed bytes into the computation. May be called repeatedly.
    fn update(&mut self, bytes: &[u8]);

    /// Finish the computation and return the content address.
    fn finalize(self: Box<Self>) -> ObjectId;
}

/// Supplies independent [`Digest`] instances on demand.
///
/// The algorithm behind the factory is swappable; the only requirement is a
/// fixed 32-byte output. Factories are shared across threads, so they must
/// be stateless or internally synchronized.
pub trait DigestFactory: Send + Sync {
    /// Create a fresh digest instance.
    fn digest(&self) -> Box<dyn Digest>;

    /// Hash a complete byte slice in one shot.
    fn hash(&self, bytes: &[u8]) -> ObjectId {
        let mut digest = self.digest();
        digest.update(bytes);
        digest.finalize()
    }
}

/// Default digest factory backed by BLAKE3.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Factory;

impl DigestFactory for Blake3Factory {
    fn digest(&self) -> Box<dyn Digest> {
        Box::new(Blake3Digest(blake3::Hasher::new()))
    }
}

struct Blake3Digest(blake3::Hasher);

impl Digest for Blake3Digest {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> ObjectId {
        ObjectId::from_digest(*self.0.finalize().as_bytes())
    }
}
