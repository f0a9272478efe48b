use crate::secret::Secret;

pub struct Vault;

impl Vault {
    pub fn open() -> u8 {
        let s = Secret::new(7);
        s.key
    }
}
