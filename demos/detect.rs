use people_reid::{
    deep::opencv::OpenCvNet,
    video::{opencv::CvCapture, BufferedCapture, VideoConfig},
    Detector, DetectorConfig, LoadVideo,
};

fn main() -> Result<(), anyhow::Error> {
    let source = std::env::args().nth(1).unwrap_or_else(|| "0".to_string());

    let mut detector = Detector::<OpenCvNet>::new(DetectorConfig::yolov3())?;
    let mut video = LoadVideo::<BufferedCapture<CvCapture>>::open(&source, &VideoConfig::default())?;

    if let Some(fps) = video.source_fps()? {
        println!("source fps: {:.1}", fps);
    }

    let mut frames = 0;
    while let Some(frame) = video.read()? {
        let detections = detector.detect(&frame)?;

        for det in detections.iter().filter(|d| d.label == "person") {
            let [x, y, w, h] = det.bbox.to_array();
            println!("#{} person {:.2} [{}, {}, {}, {}]", frames, det.confidence, x, y, w, h);
        }

        frames += 1;
    }

    println!("{} frames, {:.1} fps", frames, video.fps());
    video.release()?;

    Ok(())
}
