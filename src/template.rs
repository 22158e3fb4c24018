use crate::model::ContentType::{
    Address, Bullet, Greeting, Header, Paragraph, Reference, Subheader, TableHeader, TableRow, Text,
};
use crate::model::{ContentItem, ContentType, Document, Page};

fn item(kind: ContentType, text: &str) -> ContentItem {
    ContentItem::new(kind, text)
}

fn strong(kind: ContentType, text: &str) -> ContentItem {
    ContentItem::new(kind, text).with_bold(true)
}

impl Document {
    pub fn standard_template() -> Document {
        Document::from_pages_unchecked(standard_pages())
    }
}

fn standard_pages() -> Vec<Page> {
    vec![
        Page::new(
            "UK Power Networks - Quotation Document",
            vec![
                item(Header, "Registered Office\tCompany:"),
                item(Text, "Newington House\tUK Power Networks 237 Southwark Bridge Road (Operations) Limited London SE1 6NP"),
                item(Text, "Registered in England and Wales No: 3870728"),
                item(Text, "Date: 18 September 2024"),
                item(Text, "Our Ref: 8500308260 / QID 3500196138"),
                item(Text, "Customer Ref:"),
                item(Text, "Mahad Ali"),
                item(Text, "Ms. UK Power Op"),
                item(Text, "Fletcher Hs Cooper Standard Hs"),
                item(Text, "Cross Point Business Park, Redgrave Close"),
                item(Text, "COVENTRY"),
                item(Text, "CV2 2UU"),
                item(Greeting, "Dear Ali"),
                item(Address, "Site Address: Elephant Road / London SE17 1AY"),
                item(Paragraph, "I am writing to you on behalf of London Power Networks plc the licensed distributor of electricity for the above address trading as and referred to in the Quote as \"UK Power Networks\". Thank you for your recent enquiry regarding the above site. I am pleased to be able to provide you with this Quote to carry out the work requested."),
                item(Paragraph, "The Works will enable the provision of an import capacity of 555.000 kVA,. and a maximum export capacity of KW."),
            ],
        ),
        Page::new(
            "Summary of Your Request",
            vec![
                item(Header, "Summary of Your Request"),
                item(Text, "New services for 6 onsite commercial units within archways."),
                strong(Paragraph, "UK Power Networks would like to carry out all of the requested work for you. However, other companies can do some or all of the work for you; these are known as Independent Connection Providers (ICPs). You can approach NERS accredited ICPs directly, or you can approach an Independent Distribution Network Operator (IDNO) to request this work and they will arrange for an ICP to carry out the Contestable Works. To find out more about which ICPs work in our area and what work they can undertake please click here."),
                strong(Paragraph, "To give you as much choice as possible we are able to offer you the following options for getting your work done:"),
                item(Header, "How much is it going to cost?"),
                item(TableHeader, "Price excluding VAT\tPrice including VAT"),
                item(TableRow, "£51,043.55\t£63,652.74"),
                item(TableRow, "Not Applicable\tNot Applicable"),
                item(TableRow, "£5,396.82\t£6,476.18"),
                item(Paragraph, "A short guide is available to help you understand the three different Prices (options A, B and C). To see this guide please click here."),
            ],
        ),
        Page::new(
            "Provisional Price and Terms",
            vec![
                item(Header, "Provisional Price"),
                item(Paragraph, "I would like to draw to your attention to the provisional nature of the Quote. At the date of issue, the detailed design"),
                item(Paragraph, "and/or the procurement process is not complete and the proposed design is dependent on securing Consents and Land Rights that have not yet been obtained from third parties. We will notify you in writing if the Works, the completion date or the Price need to be adjusted once the detailed design and the procurement process is complete and the Consents and Land Rights have been obtained."),
                item(Header, "Terms and Conditions"),
                strong(Paragraph, "The Quote is subject to version 7 (September 2016) of our Terms and Conditions For Connection and Diversionary Works (the \"Terms and Conditions\") which you can view here. Alternatively, please let me know if you would like me to send you a copy in the post. The Terms and Conditions create legally binding obligations and, amongst other things, contain caps and exclusions on UK Power Networks' liability to you and grounds for variation and termination. Therefore, it is important that you take the time to read and understand them. They also contain definitions of terms used in this document and in the linked pages on our website, which you may find helpful such as \"DNO\" and \"DNO Works\"."),
            ],
        ),
        Page::new(
            "Special Conditions",
            vec![
                item(Header, "Special Conditions"),
                item(Paragraph, "The Quote is subject to and conditional upon the following conditions:-"),
                item(Bullet, "You are under an obligation to provide the required Planning Permissions (if applicable) for Your Works, associated plans, reports and documents with the Planning Permission (for example landscaping plans) and to keep the DNO informed of any changes to the same throughout the Works."),
                item(Bullet, "All onsite groundworks are the responsibility of the customer"),
                item(Bullet, "the customer is to provide access and on-site parking"),
                item(Bullet, "it is assumed all works are within site boundary."),
                item(Bullet, "This quotation is provisional based on the completion of works under 820005221"),
                item(Header, "Compliance with Engineering Recommendations P28, P29 and G5/5"),
                item(Paragraph, "If this Quote provides for export capacity (that may include install solar panels or battery storage) or import capacity with disturbing loads (that may include electric vehicle charging), you will be responsible for compliance with Engineering Recommendations P28, P29 and G5/5. More information about these Recommendations can be found here."),
                item(Paragraph, "You may be asked to demonstrate compliance with Engineering Recommendations P28, P29 and/or G5/5."),
                item(Paragraph, "UK Power Networks may refuse to allow connection of generation to our network where compliance cannot be demonstrated. Where the installation needs to be Witness Tested compliance reports will need to be provided in advance of booking a date for the Witness Test to be undertaken."),
            ],
        ),
        Page::new(
            "Connection Timeline and Dependencies",
            vec![
                item(Header, "When can you expect your electricity connection?"),
                item(Paragraph, "Once you have accepted the Quote we will call you to discuss a programme of Works. Subject to the terms of the Quote, the DNO Works referred to in the Quote will be completed on or before 31 January 2025."),
                item(Paragraph, "We will try to meet your requested dates wherever possible but the completion date will be dependent on: The date that the Quote is accepted;"),
                item(Bullet, "How much of the Works you wish UK Power Networks to complete;"),
                item(Bullet, "Any further discussions we may have with you regarding the programming of the DNO Works;"),
                item(Bullet, "The completion of work by other people or companies that must be done before we can complete our DNO Works;"),
                item(Bullet, "Approval of your design and programme for the Contestable Works by UK Power Networks (if applicable);"),
                item(Bullet, "Obtaining full access to the Site;"),
                item(Bullet, "UK Power Networks obtaining all necessary Consents and Land Rights in a timely manner;"),
                item(Paragraph, "Any delay to the Works due to: unplanned outages (i.e. breakdown or failure of electric power); or availability of planned outages (i.e. temporary suspension or withdrawal of electric power) to carry out certain works on UK Power Networks' distribution system;"),
                item(Paragraph, "Please read the details in this section in conjunction with our Terms and Conditions. Please let me know if you think we can improve the information we have provided."),
            ],
        ),
        Page::new(
            "Acceptance Process",
            vec![
                item(Paragraph, "If you would like to accept the Quote you will need to ensure that the requested payment is in UK Power Networks' nominated bank account in full and cleared funds and that we have received your signed Acceptance Form from section 5 below by 5pm on 17 March 2025."),
                item(Header, "Acceptance Form"),
                strong(Paragraph, "Email: ConnectionAcceptance@ukpowernetworks.co.uk"),
                item(Paragraph, "To accept the Quote, the signed Acceptance Form and payment in cleared funds must reach UK Power Networks by 5pm on 17 March 2025. Acceptance Forms and payments received after this date may be returned and you will need to request a new Quote."),
                item(Reference, "Job Reference: 8500308260 / 3500196138"),
                item(Header, "Acceptance Form Part 2"),
                item(Subheader, "Land Rights"),
                item(Paragraph, "If you are appointing a Solicitor to complete any legal work associated with acquiring substation sites and easements work, please provide UK Power Networks with their details by completing the table below."),
                item(Paragraph, "Please also provide us with the name and address of the owner of any affected land."),
                item(Reference, "Job Reference: 8500308260 / 3500196138"),
            ],
        ),
        Page::new(
            "Your Responsibilities",
            vec![
                item(Header, "Your Responsibilities"),
                item(Subheader, "Job Specific Responsibilities"),
                item(Subheader, "Generic Responsibilities Applicable to all Quotes"),
                item(Paragraph, "Before you decide to proceed it is very important that you read the information in this section in conjunction with our Terms and Conditions. Please let me know if you think we can improve the information we have provided."),
                item(Paragraph, "You must ensure that you have obtained all necessary consents, permissions and approvals required for Your Works including but not limited to planning permission, building regulations approval, listed building consent, conservation area consent, scheduled monument consent, and any other statutory consents."),
                item(Paragraph, "You must provide safe access to the Site for UK Power Networks personnel and contractors at all reasonable times during normal working hours and at such other times as may be agreed."),
            ],
        ),
        Page::new(
            "Information and Drawing Schedule",
            vec![
                item(Header, "Section  Information to Help You Plan For Your Work"),
                item(Subheader, "Drawing Schedule"),
                item(Paragraph, "The table below shows a summary of the standard drawings that may be useful for the Quote, along with hyperlinks to the drawings that are currently applicable. Our drawings are revised periodically so the links in the table below may not work in the future if the drawings are superseded. However the latest versions of all of our standard drawings can be found here. If you have not used our G81 web pages before you will be asked to register your credentials for future logins and updates."),
                item(Subheader, "Job Specific Information"),
                item(Subheader, "Generic Information Applicable to all Quotes"),
                item(Paragraph, "If you are unhappy with our service please follow our Complaints Procedure Specific to Commercial and Industrial Projects which can be found here. This document details your right to contact Ofgem for a formal determination if we have been unable to resolve the matter to your satisfaction."),
                item(Paragraph, "All electrical installation work must be carried out by a competent person in accordance with the current edition of the IET Wiring Regulations (BS 7671) and must be tested and certified accordingly."),
                item(Paragraph, "You must ensure that all equipment connected to our network complies with the relevant British Standards and European Norms."),
            ],
        ),
        Page::new(
            "Safety and Compliance Requirements",
            vec![
                item(Header, "Safety and Compliance Requirements"),
                item(Paragraph, "All work must be carried out in accordance with the Health and Safety at Work etc. Act 1974 and all other relevant health and safety legislation."),
                item(Paragraph, "You must ensure that all personnel working on the Site are competent and appropriately trained for the work they are undertaking."),
                item(Paragraph, "Risk assessments and method statements must be prepared for all work activities and copies provided to UK Power Networks upon request."),
                item(Paragraph, "All excavation work must be carried out in accordance with HSE guidance HSG47 \"Avoiding danger from underground services\"."),
                item(Paragraph, "You must ensure that appropriate insurance cover is in place for all work activities as specified in our Terms and Conditions."),
            ],
        ),
        Page::new(
            "Technical Standards and Specifications",
            vec![
                item(Header, "Technical Standards and Specifications"),
                item(Paragraph, "All equipment and materials used must comply with the relevant British Standards, European Norms, and UK Power Networks' technical specifications."),
                item(Paragraph, "Cable installation must be in accordance with UK Power Networks' standard drawings and specifications."),
                item(Paragraph, "All jointing and termination work must be carried out by personnel approved by UK Power Networks."),
                item(Paragraph, "Testing and commissioning must be carried out in accordance with UK Power Networks' procedures and witnessed by our representatives where required."),
                item(Paragraph, "All protection settings and control schemes must be approved by UK Power Networks before energisation."),
            ],
        ),
        Page::new(
            "Environmental and Planning Considerations",
            vec![
                item(Header, "Environmental and Planning Considerations"),
                item(Paragraph, "All work must be carried out with due regard to environmental protection and sustainability."),
                item(Paragraph, "Any work affecting protected species or habitats must be carried out under appropriate licences and with ecological supervision where required."),
                item(Paragraph, "Noise and dust control measures must be implemented to minimise impact on local residents and businesses."),
                item(Paragraph, "All waste materials must be disposed of in accordance with current waste management regulations."),
                item(Paragraph, "Traffic management plans must be agreed with the relevant highway authority where work affects public highways."),
            ],
        ),
        Page::new(
            "Quality Assurance and Documentation",
            vec![
                item(Header, "Quality Assurance and Documentation"),
                item(Paragraph, "All work must be subject to appropriate quality assurance procedures and documentation."),
                item(Paragraph, "As-built drawings must be provided showing the final installation details and any deviations from the original design."),
                item(Paragraph, "Test certificates and commissioning records must be provided for all electrical installations."),
                item(Paragraph, "Operation and maintenance manuals must be provided for all installed equipment."),
                item(Paragraph, "All documentation must be provided in both hard copy and electronic format as specified by UK Power Networks."),
            ],
        ),
        Page::new(
            "Warranty and Maintenance",
            vec![
                item(Header, "Warranty and Maintenance"),
                item(Paragraph, "All equipment and workmanship must be warranted for a minimum period of 12 months from the date of commissioning."),
                item(Paragraph, "Defects liability period shall commence from the date of successful commissioning and acceptance by UK Power Networks."),
                item(Paragraph, "Maintenance requirements and schedules must be agreed with UK Power Networks before commissioning."),
                item(Paragraph, "Emergency contact details must be provided for 24/7 response to equipment failures or safety issues."),
                item(Paragraph, "Spare parts availability and support arrangements must be confirmed for all installed equipment."),
            ],
        ),
        Page::new(
            "Contact Information and Final Notes",
            vec![
                item(Header, "Contact Information"),
                item(Paragraph, "For technical queries regarding this quotation, please contact our Engineering team."),
                item(Paragraph, "For commercial and contractual matters, please contact our Commercial team."),
                item(Paragraph, "For emergency situations affecting the electricity network, please call our 24-hour emergency number."),
                item(Header, "Final Notes"),
                item(Paragraph, "This quotation is valid for 90 days from the date of issue."),
                item(Paragraph, "UK Power Networks reserves the right to review and amend this quotation if circumstances change."),
                item(Paragraph, "Thank you for choosing UK Power Networks for your electricity connection requirements."),
                item(Reference, "Document Reference: UKPN-QUO-2024-8500308260"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PAGE_COUNT;

    #[test]
    fn standard_template_has_every_page_populated() {
        let doc = Document::standard_template();
        assert_eq!(doc.page_count(), PAGE_COUNT);
        for (number, page) in doc.pages() {
            assert!(!page.title.is_empty(), "page {number} has no title");
            assert!(!page.is_empty(), "page {number} has no content");
        }
    }

    #[test]
    fn standard_template_item_counts_are_fixed() {
        let doc = Document::standard_template();
        let counts: Vec<usize> = doc.pages().map(|(_, p)| p.content().len()).collect();
        assert_eq!(counts, vec![16, 10, 5, 11, 11, 10, 6, 8, 6, 6, 6, 6, 6, 9]);
    }

    #[test]
    fn pricing_table_rows_are_tab_separated() {
        let doc = Document::standard_template();
        let header = doc.item(2, 5).unwrap();
        assert_eq!(header.kind(), TableHeader);
        assert_eq!(header.text(), "Price excluding VAT\tPrice including VAT");
        assert!(doc.item(2, 2).unwrap().bold());
    }
}
