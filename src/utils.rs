use rand::Rng;

#[macro_export]
macro_rules! unit {
  ($name:expr, $($tail:tt)*) => {
    {
      log::debug!("* {}", $name);
      let now = std::time::Instant::now();
      let value = $($tail)*;
      log::debug!("Done  `{}` ({} ms)", $name, now.elapsed().as_millis());
      value
    }
  };
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Blob key `<prefix>-<unix millis>-<13 random base36 chars>.<extension>`.
pub fn image_path(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let random: String = (0..13)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}.{}", prefix, timestamp, random, extension)
}
