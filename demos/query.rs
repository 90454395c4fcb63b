use people_reid::{
    dataset::{NegativePeopleConfig, NegativePeopleDataset},
    deep::opencv::{read_image, OpenCvNet},
    Classifier, ClassifierConfig, MetricKind, Reid,
};

fn main() -> Result<(), anyhow::Error> {
    let mut dataset = NegativePeopleDataset::new(NegativePeopleConfig::new(18, 9))?;
    let classifier = Classifier::<OpenCvNet>::new(ClassifierConfig::resnet50())?;
    let mut reid = Reid::new(classifier, MetricKind::Cosine);

    let n = reid.enroll(&mut dataset, |p| read_image(p))?;
    println!("gallery: {} images", n);

    let (query, ranking) = reid.query(&mut dataset, None, |p| read_image(p))?;
    match ranking {
        Some(ranking) => {
            println!("query {} ({:?})", query.label, query.path);
            for m in ranking.iter().take(5) {
                println!("  {:>4} {:.4} {:?}", m.label, m.distance, m.path);
            }
        }
        None => println!("query image {} is missing", query.index),
    }

    Ok(())
}
