#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::Time;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.delta, Duration::default());
        assert!(time.delta_millis().abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();

        // Initial delta should be zero
        assert_eq!(time.delta, Duration::default());

        sleep(Duration::from_millis(10));

        // Update should change the delta
        time.update();
        assert!(time.delta > Duration::default());
    }

    #[test]
    fn test_delta_millis() {
        let mut time = Time::new();

        let sleep_duration = Duration::from_millis(10);
        sleep(sleep_duration);
        time.update();

        // Sleep never returns early; allow generous slack on slow machines
        let actual = time.delta_millis();
        assert!(actual >= 10.0);
        assert!(actual < 100.0);
    }
}
