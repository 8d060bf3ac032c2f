//! Who-knows-whom over public FOAF documents.

use metaweb::{foaf, DocumentGraph, Triple, TriplePattern};

fn main() -> metaweb::Result<()> {
    metaweb::init_logging();

    let mut graph = DocumentGraph::new();
    graph.load_url("http://bigasterisk.com/foaf.rdf")?;
    graph.load_url("http://www.w3.org/People/Berners-Lee/card.rdf")?;
    graph.load_url("http://danbri.livejournal.com/data/foaf")?;
    graph.bind("foaf", foaf());

    // Some FOAF exports use member_name where others use name; mirror them
    let member_name = foaf().get("member_name")?;
    let name = foaf().get("name")?;
    for triple in graph.triples_matching(None, Some(&member_name), None) {
        graph.insert(&Triple::new(triple.subject, name.clone(), triple.object));
    }

    for row in graph.query(&[
        TriplePattern::new("?a", "foaf:knows", "?b"),
        TriplePattern::new("?a", "foaf:name", "?aname"),
        TriplePattern::new("?b", "foaf:name", "?bname"),
    ])? {
        println!("{} knows {}", row["aname"], row["bname"]);
    }

    Ok(())
}
