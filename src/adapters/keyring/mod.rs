#[cfg(test)]
pub mod memory_keyring;
pub mod os_keyring;
