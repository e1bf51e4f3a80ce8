use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tileview::prelude::*;

/// Integration tests driving the viewer the way a host page does: input
/// events go through the gesture controller, frames come from the host's
/// animation loop and tile loads complete whenever the test decides.
#[cfg(test)]
mod viewer_flow_tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestTile {
        url: String,
    }

    impl TileImage for TestTile {
        fn width(&self) -> u32 {
            256
        }

        fn height(&self) -> u32 {
            256
        }
    }

    /// In-memory tile server; URLs containing any of `missing` answer 404
    #[derive(Default)]
    struct MemoryServer {
        missing: Vec<String>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryServer {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageFetcher for MemoryServer {
        type Image = TestTile;

        async fn fetch(&self, url: &str) -> Result<TestTile> {
            self.requests.lock().unwrap().push(url.to_string());
            if self.missing.iter().any(|m| url.contains(m.as_str())) {
                return Err(MapError::Http(format!("HTTP 404 Not Found for {}", url)));
            }
            Ok(TestTile {
                url: url.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct FrameCounter(AtomicUsize);

    impl FrameScheduler for FrameCounter {
        fn request_frame(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Host {
        view: MapView<MemoryServer>,
        gestures: GestureController,
        canvas: RenderContext<TestTile>,
        server: Arc<MemoryServer>,
        spawner: QueuedSpawner,
        frames: Arc<FrameCounter>,
    }

    impl Host {
        fn new(config: ViewerConfig, server: MemoryServer) -> Self {
            tileview::init_logger();
            let server = Arc::new(server);
            let spawner = QueuedSpawner::new();
            let frames = Arc::new(FrameCounter::default());
            let mut view = MapView::new(
                config.clone(),
                server.clone(),
                Arc::new(spawner.clone()),
                frames.clone(),
            )
            .unwrap();
            view.set_size(Size::new(512.0, 512.0), 2.0);
            Self {
                view,
                gestures: GestureController::with_options(config.gestures),
                canvas: RenderContext::new(),
                server,
                spawner,
                frames,
            }
        }

        fn input(&mut self, event: InputEvent) -> EventHandled {
            self.gestures.handle_event(&event, &mut self.view)
        }

        fn frame(&mut self) -> Option<RenderStats> {
            self.canvas.begin_frame();
            self.view.on_frame(&mut self.canvas)
        }

        /// Completes every outstanding load and runs the following frame
        fn settle(&mut self) -> Option<RenderStats> {
            self.spawner.run_pending();
            self.frame()
        }
    }

    #[test]
    fn test_first_frame_loads_visible_tiles() {
        println!("[TEST] first frame requests visible tiles");
        let mut host = Host::new(ViewerConfig::default(), MemoryServer::default());

        let first = host.frame().unwrap();
        assert!(first.visible() >= 4);
        assert_eq!(first.blank, first.visible());
        assert_eq!(host.spawner.pending(), first.visible());
        assert_eq!(host.frames.0.load(Ordering::SeqCst), 1);

        let second = host.settle().unwrap();
        assert!(second.is_complete());
        assert_eq!(second.exact, first.visible());
        assert_eq!(host.server.requests().len(), first.visible());
        assert!(host
            .server
            .requests()
            .iter()
            .all(|url| url.starts_with("https://assets.concept3d.com/assets/1005/1005_Maps/20/")));

        // Nothing changed, nothing loading: the loop goes quiet
        assert!(host.frame().is_none());
    }

    #[test]
    fn test_drag_pans_the_view() {
        let mut host = Host::new(ViewerConfig::default(), MemoryServer::default());
        host.frame();
        host.settle();

        assert_eq!(
            host.input(InputEvent::PointerDown(PointerInput::new(1, 100.0, 100.0))),
            EventHandled::Handled
        );
        host.input(InputEvent::PointerMove(PointerInput::new(1, 140.0, 70.0)));
        host.input(InputEvent::PointerUp(PointerInput::new(1, 140.0, 70.0)));

        let view = host.view.transformation();
        assert!(view.approx_eq(
            &Transformation::translate(Point::new(40.0, -30.0)),
            1e-9
        ));
        assert!(host.view.needs_render());
        assert!(!host.gestures.is_active());

        let stats = host.frame().unwrap();
        assert!(stats.visible() >= 4);
    }

    #[test]
    fn test_two_finger_rotation_reaches_view() {
        let mut host = Host::new(ViewerConfig::default(), MemoryServer::default());

        host.input(InputEvent::PointerDown(PointerInput::new(1, 100.0, 100.0)));
        host.input(InputEvent::PointerDown(PointerInput::new(2, 200.0, 100.0)));
        host.input(InputEvent::PointerMove(PointerInput::new(2, 100.0, 200.0)));

        let view = host.view.transformation();
        assert!((view.rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!((view.scale_factor() - 1.0).abs() < 1e-9);

        let stats = host.frame().unwrap();
        assert!(stats.visible() > 0);
    }

    #[test]
    fn test_zoom_in_falls_back_to_loaded_parents() {
        println!("[TEST] zooming in shows cropped parents while children load");
        let mut host = Host::new(ViewerConfig::default(), MemoryServer::default());
        host.view.set(Transformation::compose([
            Transformation::translate(Point::new(256.0, 256.0)),
            Transformation::scale(0.5),
            Transformation::translate(Point::new(-256.0, -256.0)),
        ]));

        let coarse = host.frame().unwrap();
        assert_eq!(coarse.blank, coarse.visible());
        assert!(host.settle().unwrap().is_complete());
        assert!(host.server.requests().iter().all(|url| url.contains("/19/")));

        // Wheel towards the user zooms in about the cursor
        let handled = host.input(InputEvent::Wheel(WheelInput::new(
            Point::new(256.0, 256.0),
            0.0,
            -1000.0,
        )));
        assert_eq!(handled, EventHandled::Handled);
        assert!(host.view.transformation().scale_factor() > 1.0);

        let zoomed = host.frame().unwrap();
        assert_eq!(zoomed.fallback, zoomed.visible());
        assert!(host
            .canvas
            .images()
            .all(|(tile, source, _)| tile.url.contains("/19/") && source.is_some()));

        let sharp = host.settle().unwrap();
        assert!(sharp.is_complete());
        assert!(host
            .canvas
            .images()
            .all(|(tile, source, _)| tile.url.contains("/20/") && source.is_none()));
    }

    #[test]
    fn test_failed_tiles_stay_blank_without_retry() {
        let server = MemoryServer {
            missing: vec!["/20/".to_string()],
            ..Default::default()
        };
        let mut host = Host::new(ViewerConfig::default(), server);

        let first = host.frame().unwrap();
        // Failures are not news: no redraw is triggered
        host.spawner.run_pending();
        assert!(host.frame().is_none());

        host.view.set(host.view.transformation());
        let again = host.frame().unwrap();
        assert_eq!(again.blank, first.visible());
        assert_eq!(host.spawner.pending(), 0);
        assert_eq!(host.server.requests().len(), first.visible());
    }

    #[test]
    fn test_concurrency_limit_from_json_config() {
        let config = ViewerConfig::from_json_str(
            r#"{
                "base_url": "http://localhost:8080/tiles/",
                "cache": { "concurrent_load_limit": 2 },
                "gestures": { "scroll_mode": true }
            }"#,
        )
        .unwrap();
        let mut host = Host::new(config, MemoryServer::default());

        let first = host.frame().unwrap();
        assert!(first.visible() > 2);
        assert_eq!(host.spawner.pending(), 2);
        assert_eq!(host.view.cache().queued(), first.visible() - 2);

        let mut rounds = 0;
        while host.view.cache().is_busy() {
            host.settle();
            rounds += 1;
            assert!(rounds < 100);
        }
        assert!(host
            .server
            .requests()
            .iter()
            .all(|url| url.starts_with("http://localhost:8080/tiles/20/")));
        assert!(host.view.last_stats().is_complete());

        // Scroll mode: plain scrolling pans
        host.input(InputEvent::Wheel(WheelInput::new(
            Point::new(10.0, 10.0),
            5.0,
            20.0,
        )));
        assert!(host.view.transformation().approx_eq(
            &Transformation::translate(Point::new(-5.0, -20.0)),
            1e-9
        ));
    }

    #[test]
    fn test_backing_surface_uses_device_pixels() {
        let host = Host::new(ViewerConfig::default(), MemoryServer::default());
        assert_eq!(host.view.backing_size(), (1024, 1024));
        assert_eq!(host.view.device_pixel_ratio(), 2.0);
    }
}
