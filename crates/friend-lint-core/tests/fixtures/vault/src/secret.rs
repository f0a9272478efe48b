use crate::vault::Vault;

#[friend(Vault)]
pub struct Secret {
    pub key: u8,
}

impl Secret {
    pub fn new(key: u8) -> Self {
        Secret { key }
    }
}
