pub mod secret;
pub mod vault;

pub struct Other;

impl Other {
    pub fn steal() -> u8 {
        let s = secret::Secret::new(1);
        s.key
    }
}
