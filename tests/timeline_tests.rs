use glam::Vec3;
use scroll_orbit::timeline::{orbit_waypoint, ScrollTimeline};
use scroll_orbit::PageScroll;

const VIEWPORT_HEIGHT: f32 = 700.0;

fn timeline(sections: usize) -> ScrollTimeline {
    ScrollTimeline::build(
        &vec![0.0; sections],
        VIEWPORT_HEIGHT,
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(0.0, -8.0, -1.0),
        15.0,
        5.0,
    )
    .unwrap()
}

#[cfg(test)]
mod scrub_tests {
    use super::*;

    #[test]
    fn test_sampling_is_a_pure_function_of_scroll() {
        let timeline = timeline(5);
        let end = timeline.trigger().end;
        let offsets: Vec<f32> = (0..=40).map(|i| end * i as f32 / 40.0).collect();

        let forward: Vec<_> = offsets.iter().map(|&s| timeline.sample(s)).collect();
        let backward: Vec<_> = offsets.iter().rev().map(|&s| timeline.sample(s)).collect();

        for (a, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_camera_path_is_continuous() {
        let timeline = timeline(6);
        let end = timeline.trigger().end;
        let mut last = timeline.sample(0.0).camera_position;

        for i in 1..=600 {
            let position = timeline.sample(end * i as f32 / 600.0).camera_position;
            assert!(
                (position - last).length() < 1.0,
                "jump of {} at step {}",
                (position - last).length(),
                i
            );
            last = position;
        }
    }

    #[test]
    fn test_scroll_for_time_inverts_time_at() {
        let timeline = timeline(4);
        for t in [0.0, 0.5, 1.0, 2.25, 3.9, 4.0] {
            let scroll = timeline.scroll_for_time(t);
            assert!((timeline.time_at(scroll) - t).abs() < 1e-4, "time {}", t);
        }
    }

    #[test]
    fn test_every_slot_ends_on_its_waypoint() {
        for sections in 1..=8 {
            let timeline = timeline(sections);
            for i in 0..sections {
                let sample = timeline.sample_time((i + 1) as f32);
                let expected = orbit_waypoint(i, sections, 15.0, 5.0);
                assert!(
                    (sample.camera_position - expected).length() < 1e-3,
                    "{} sections, slot {}",
                    sections,
                    i
                );
            }
        }
    }

    #[test]
    fn test_samples_always_look_at_model() {
        let timeline = timeline(3);
        assert_eq!(timeline.sample(123.0).look_at, Vec3::new(0.0, -8.0, -1.0));
    }
}

#[cfg(test)]
mod page_tests {
    use super::*;

    #[test]
    fn test_pin_spacing_extends_document() {
        let timeline = timeline(3);
        let scroll = PageScroll::new(3, VIEWPORT_HEIGHT, timeline.trigger().pin_spacing());

        // N·vh + (N−1)·vh − vh
        assert_eq!(scroll.max(), 3.0 * 700.0 + 2.0 * 700.0 - 700.0);
        assert!(timeline.trigger().is_pinned(timeline.trigger().end));
        assert!(!timeline.trigger().is_pinned(scroll.max()));
    }

    #[test]
    fn test_full_page_scroll_completes_timeline() {
        let timeline = timeline(3);
        let mut scroll = PageScroll::new(3, VIEWPORT_HEIGHT, timeline.trigger().pin_spacing());
        scroll.scroll_to(f32::MAX);

        let sample = timeline.sample(scroll.offset());
        assert_eq!(sample.time, 3.0);
        assert_eq!(sample.overlay_opacity, vec![1.0; 3]);
    }
}
