use bitflags::bitflags;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Platforms an entry is available on. `CHROMEOS_OWNER_ONLY` is not an
    /// OS of its own: it marks entries that only the device owner may change,
    /// and is folded into the effective mask during visibility checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Platforms: u32 {
        const WINDOWS = 1 << 0;
        const MACOS = 1 << 1;
        const LINUX = 1 << 2;
        const CHROMEOS = 1 << 3;
        const CHROMEOS_OWNER_ONLY = 1 << 4;
        const ANDROID = 1 << 5;
        const DEPRECATED = 1 << 6;
    }
}

impl Platforms {
    /// The platform the current build is running on.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::WINDOWS
        } else if cfg!(target_os = "macos") {
            Self::MACOS
        } else if cfg!(target_os = "android") {
            Self::ANDROID
        } else {
            Self::LINUX
        }
    }
}

// Serialized as an array of flag names so registries can live in JSON
// fixtures without exposing the bit values.
impl Serialize for Platforms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_names().map(|(name, _)| name))
    }
}

impl<'de> Deserialize<'de> for Platforms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        let mut mask = Platforms::empty();
        for name in &names {
            let flag = Platforms::from_name(name)
                .ok_or_else(|| D::Error::custom(format!("unknown platform name: {name}")))?;
            mask |= flag;
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_is_a_single_os() {
        let current = Platforms::current();
        assert_eq!(current.iter_names().count(), 1);
        assert!(!current.contains(Platforms::CHROMEOS_OWNER_ONLY));
    }

    #[test]
    fn test_serde_round_trip_uses_names() {
        let mask = Platforms::WINDOWS | Platforms::LINUX;
        let json = serde_json::to_string(&mask).unwrap();
        assert_eq!(json, r#"["WINDOWS","LINUX"]"#);
        let parsed: Platforms = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mask);
    }

    #[test]
    fn test_unknown_platform_name_is_rejected() {
        let result: Result<Platforms, _> = serde_json::from_str(r#"["BEOS"]"#);
        assert!(result.is_err());
    }
}
